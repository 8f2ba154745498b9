
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Applies one edit event to the partitions of a haplotype
pub mod edit_applier;
/// Per-haplotype state: partitions, variants, and the branch arena
pub mod haplotype_track;
/// Builds the final haplotype sequence from a content partition
pub mod materializer;
/// Runs a clone end to end
pub mod orchestrator;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Combines the haplotypes of a chromosome into copy number and allele frequency reports
pub mod reconciler;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
