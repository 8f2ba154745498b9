
/// Branch tree bookkeeping for surviving copies of a point variant
pub mod branch_tree;
/// Chromosome-level copy number and variant reports
pub mod combined;
/// Edit script events and their parsing
pub mod edit_event;
/// Ordered segment lists and their split/insert primitives
pub mod partition;
/// Typed intervals in reference coordinates
pub mod segment;
/// Point variants tracked on a haplotype
pub mod variant_record;

