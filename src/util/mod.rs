
/// Helper functions for reading JSON via serde
pub mod json_io;
/// Helper functions for generating the progress bars
pub mod progress_bar;
