
use log::debug;

use crate::data_types::branch_tree::BranchArena;
use crate::data_types::edit_event::EditEvent;
use crate::data_types::partition::Partition;
use crate::data_types::variant_record::VariantRecord;
use crate::edit_applier::{apply_event, EditError};
use crate::materializer::{materialize, MaterializeError};

/// Everything tracked for one haplotype copy of one chromosome
#[derive(Clone, Debug)]
pub struct HaplotypeTrack {
    /// Chromosome name
    chrom: String,
    /// Haplotype label, e.g. "A" or "B12"
    label: String,
    /// Length of the source chromosome
    length: u64,
    /// Sequence content
    content: Partition,
    /// Copy number for reporting; starts as a single block with copy number 1
    copy_number: Partition,
    /// Point variants applied to this haplotype, in application order
    variants: Vec<VariantRecord>,
    /// Branch nodes for all variants in `variants`
    arena: BranchArena
}

impl HaplotypeTrack {
    /// Creates an unedited track over `[1, length]`
    pub fn new(chrom: String, label: String, length: u64) -> Self {
        Self {
            chrom, label, length,
            content: Partition::new_reference(length),
            copy_number: Partition::new_copy_number(length, 1),
            variants: vec![],
            arena: BranchArena::default()
        }
    }

    /// Applies, in order, every event inherited by this haplotype
    /// # Errors
    /// * if any event fails to apply, see `edit_applier::apply_event`
    pub fn apply_events<'a>(&mut self, events: impl IntoIterator<Item = &'a EditEvent>) -> Result<(), EditError> {
        for event in events.into_iter() {
            if event.applies_to(&self.chrom, &self.label) {
                debug!("Applying {:?} to {}{}", event.kind(), self.chrom, self.label);
                apply_event(self, event)?;
            }
        }
        Ok(())
    }

    /// Records a newly applied point variant with a single copy
    pub(crate) fn add_variant(&mut self, position: u64, reference: Vec<u8>, alternate: Vec<u8>) {
        let record = VariantRecord::new(&mut self.arena, position, reference, alternate, self.label.clone());
        self.variants.push(record);
    }

    /// Pushes a copy-number event into the branch tree of every variant it covers
    pub(crate) fn adjust_variant_branches(&mut self, start: u64, end: u64, copies: u32) {
        for record in self.variants.iter_mut()
            .filter(|r| r.is_covered_by(start, end)) {
            record.adjust_branches(&mut self.arena, start, end, copies);
        }
    }

    /// Computes the surviving copy count of every variant; call once all events are applied
    pub fn finalize_counts(&mut self) {
        for record in self.variants.iter_mut() {
            record.finalize(&self.arena);
        }
    }

    /// Builds the haplotype sequence from the content partition
    /// # Arguments
    /// * `reference` - the full chromosome sequence
    /// # Errors
    /// * see `materializer::materialize`
    pub fn materialize(&self, reference: &[u8]) -> Result<Vec<u8>, MaterializeError> {
        materialize(&self.content, reference)
    }

    pub(crate) fn content_mut(&mut self) -> &mut Partition {
        &mut self.content
    }

    pub(crate) fn copy_number_mut(&mut self) -> &mut Partition {
        &mut self.copy_number
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn content(&self) -> &Partition {
        &self.content
    }

    pub fn copy_number(&self) -> &Partition {
        &self.copy_number
    }

    pub fn variants(&self) -> &[VariantRecord] {
        &self.variants
    }
}
