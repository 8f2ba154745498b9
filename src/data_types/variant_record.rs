
use crate::data_types::branch_tree::{BranchArena, BranchId};

/// One point mutation or indel tracked on a haplotype, along with the copies it has accumulated
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantRecord {
    /// Reference position of the variant, 1-based
    position: u64,
    /// The reference allele
    reference: Vec<u8>,
    /// The alternate allele
    alternate: Vec<u8>,
    /// Root level of the branch tree, stored in the owning track's arena
    branches: Vec<BranchId>,
    /// Number of surviving copies, filled in once all events are applied
    final_copy_count: Option<u64>,
    /// Haplotype carrying the record
    haplotype_label: String
}

impl VariantRecord {
    /// Creates a new record with a single leaf at `position`
    /// # Arguments
    /// * `arena` - arena that will own the branch nodes
    /// * `position` - 1-based position of the variant
    /// * `reference` - reference allele
    /// * `alternate` - alternate allele
    /// * `haplotype_label` - the haplotype that carries the variant
    pub fn new(arena: &mut BranchArena, position: u64, reference: Vec<u8>, alternate: Vec<u8>, haplotype_label: String) -> Self {
        let branches = arena.new_variant_level(position);
        Self {
            position, reference, alternate, branches,
            final_copy_count: None,
            haplotype_label
        }
    }

    /// Returns true if the variant position is inside `[start, end]`
    pub fn is_covered_by(&self, start: u64, end: u64) -> bool {
        start <= self.position && self.position <= end
    }

    /// Pushes a copy-number event through the branch tree
    pub fn adjust_branches(&mut self, arena: &mut BranchArena, start: u64, end: u64, copies: u32) {
        let level = std::mem::take(&mut self.branches);
        self.branches = arena.adjust_branches(level, start, end, copies);
    }

    /// Counts the surviving copies and stores the result
    pub fn finalize(&mut self, arena: &BranchArena) -> u64 {
        let count = arena.count_leaves(&self.branches);
        self.final_copy_count = Some(count);
        count
    }

    // getters
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    pub fn alternate(&self) -> &[u8] {
        &self.alternate
    }

    pub fn branches(&self) -> &[BranchId] {
        &self.branches
    }

    /// The surviving copy count; `None` until `finalize()` is called
    pub fn final_copy_count(&self) -> Option<u64> {
        self.final_copy_count
    }

    pub fn haplotype_label(&self) -> &str {
        &self.haplotype_label
    }
}
