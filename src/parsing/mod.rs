/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Per-clone edit script parsing
pub mod edit_script;
/// Run parameters file with defaults
pub mod parameters;
/// Reference FASTA and index loading
pub mod reference;
