/*!
# CLI module
Command line interface functionality that is specific to Hapsmith.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The incorporate CLI subcommand
pub mod incorporate;
