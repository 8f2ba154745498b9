/*!
# Edit applier
Applies one edit script event to a haplotype track.
Point events (SNVs, insertions) replace a single position of the content partition with literal bases.
Copy-number events and deletions cut the partition at the event boundaries, then duplicate, invert, or remove the segments in between.
Copy-number events additionally push their copy count through the branch tree of every variant they cover.
*/
use log::trace;

use crate::data_types::edit_event::{EditEvent, EventKind, IndelType, Orientation};
use crate::data_types::partition::{Partition, PartitionError};
use crate::data_types::segment::{InversionFlag, Segment};
use crate::haplotype_track::HaplotypeTrack;

/// Structural edits must be longer than this to show up in the copy-number partition
pub const COPY_NUMBER_MIN_SPAN: u64 = 50;

#[derive(thiserror::Error, Debug)]
pub enum EditError {
    #[error("event range {start}-{end} lies outside {chrom} (length {length})")]
    OutOfRange { chrom: String, start: u64, end: u64, length: u64 },
    #[error("copy count {copies} does not match the {orientations} provided orientations")]
    OrientationMismatch { copies: u32, orientations: usize },
    #[error("no segment covers position {position}")]
    UnlocatedPosition { position: u64 },
    #[error("no segments remain inside {start}-{end}")]
    EmptyCopySet { start: u64, end: u64 },
    #[error("partition error: {0}")]
    Partition(#[from] PartitionError)
}

/// A copy-number change over `[start, end]`: the covered segments are replaced by one copy per orientation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructuralEdit {
    start: u64,
    end: u64,
    copies: u32,
    orientations: Vec<Orientation>
}

impl StructuralEdit {
    /// Constructor with checks
    /// # Errors
    /// * if `copies` does not match the number of orientations, including a deletion (0 copies) with orientations
    pub fn new(start: u64, end: u64, copies: u32, orientations: Vec<Orientation>) -> Result<Self, EditError> {
        if copies as usize != orientations.len() {
            return Err(EditError::OrientationMismatch { copies, orientations: orientations.len() });
        }
        Ok(Self {
            start, end, copies, orientations
        })
    }

    /// Removes `[start, end]`
    pub fn deletion(start: u64, end: u64) -> Self {
        Self {
            start, end,
            copies: 0,
            orientations: vec![]
        }
    }

    /// Number of reference positions affected
    pub fn span(&self) -> u64 {
        self.end + 1 - self.start
    }

    /// Small edits only touch the sequence, not the reported copy number
    pub fn affects_copy_number(&self) -> bool {
        self.span() > COPY_NUMBER_MIN_SPAN
    }

    // getters
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }
}

/// Applies a single event to the track.
/// Aneuploidy events are a no-op here, whole-chromosome copies are modeled by which haplotype tracks exist.
/// # Arguments
/// * `track` - the haplotype receiving the event
/// * `event` - the event to apply, assumed to belong to this track
/// # Errors
/// * if the event range is outside the chromosome
/// * if the partition no longer contains the targeted positions
/// * if a copy-number event has a mismatched orientation list
pub fn apply_event(track: &mut HaplotypeTrack, event: &EditEvent) -> Result<(), EditError> {
    match event.kind() {
        EventKind::Snv { position, reference, alternate } => {
            check_range(track, *position, *position)?;
            apply_point_edit(track.content_mut(), *position, alternate.clone())?;
            track.add_variant(*position, reference.clone(), alternate.clone());
        },
        EventKind::Indel { position, length, reference, alternate, indel_type } => {
            match indel_type {
                IndelType::Insertion => {
                    check_range(track, *position, *position)?;
                    apply_point_edit(track.content_mut(), *position, alternate.clone())?;
                },
                IndelType::Deletion => {
                    // the anchor base at `position` is kept
                    let end = event_end(track, *position, length.checked_add(1))?;
                    let edit = StructuralEdit::deletion(position + 1, end);
                    check_range(track, edit.start(), edit.end())?;
                    apply_structural_edit(track.content_mut(), &edit)?;
                    if edit.affects_copy_number() {
                        apply_structural_edit(track.copy_number_mut(), &edit)?;
                    }
                }
            };
            track.add_variant(*position, reference.clone(), alternate.clone());
        },
        EventKind::Cnv { start, length, copies, orientations } => {
            let end = event_end(track, *start, Some(*length))?;
            let edit = StructuralEdit::new(*start, end, *copies, orientations.clone())?;
            check_range(track, edit.start(), edit.end())?;
            apply_structural_edit(track.content_mut(), &edit)?;
            if edit.affects_copy_number() {
                apply_structural_edit(track.copy_number_mut(), &edit)?;
            }
            track.adjust_variant_branches(edit.start(), edit.end(), edit.copies());
        },
        EventKind::Aneuploidy => {}
    };
    Ok(())
}

/// Replaces the base at `position` with `bases`
/// # Errors
/// * if no segment covers `position`, e.g. it was deleted earlier
pub fn apply_point_edit(partition: &mut Partition, position: u64, bases: Vec<u8>) -> Result<(), EditError> {
    let index = partition.find_first_ending_at(position, 0)
        .filter(|&i| partition.segments()[i].contains(position))
        .ok_or(EditError::UnlocatedPosition { position })?;
    partition.insert_point(index, Segment::literal(position, bases))?;
    Ok(())
}

/// Cuts the partition at the edit boundaries and replaces the first run of segments inside the edit with the requested copies.
/// Reversed copies get their outermost segments flagged for reverse-complementing.
/// # Errors
/// * if no segment lies inside the edit range
/// * if the partition refuses a split
pub fn apply_structural_edit(partition: &mut Partition, edit: &StructuralEdit) -> Result<(), EditError> {
    let (start, end) = (edit.start(), edit.end());
    let first = partition.find_first_ending_at(start, 0)
        .ok_or(EditError::EmptyCopySet { start, end })?;
    if partition.segments()[first].overlaps(start, end) {
        partition.split(first, start, end)?;
    }
    if let Some(last) = partition.find_first_ending_at(end, first) {
        if partition.segments()[last].overlaps(start, end) {
            partition.split(last, start, end)?;
        }
    }

    let run = partition.find_run_within(start, end, first)
        .ok_or(EditError::EmptyCopySet { start, end })?;
    let copy_set = &partition.segments()[run.clone()];
    trace!("Replacing {} segments in {start}-{end} with {} copies", copy_set.len(), edit.copies());

    let replacement: Vec<Segment> = edit.orientations.iter()
        .flat_map(|orientation| {
            let mut copy = copy_set.to_vec();
            if *orientation == Orientation::Reverse {
                mark_inverted(&mut copy);
            }
            copy
        })
        .collect();
    partition.replace_run(run, replacement);
    Ok(())
}

/// Flags a copied block so it is reverse-complemented as a unit
fn mark_inverted(copy: &mut [Segment]) {
    match copy {
        [] => {},
        [single] => single.set_flag(InversionFlag::Single),
        [first, .., last] => {
            first.set_flag(InversionFlag::Start);
            last.set_flag(InversionFlag::End);
        }
    }
}

/// Last position of an event covering `span` positions from `start`, failing if the sum overflows
fn event_end(track: &HaplotypeTrack, start: u64, span: Option<u64>) -> Result<u64, EditError> {
    span.and_then(|span| start.checked_add(span))
        .map(|end| end.saturating_sub(1))
        .ok_or_else(|| EditError::OutOfRange { chrom: track.chrom().to_string(), start, end: u64::MAX, length: track.length() })
}

fn check_range(track: &HaplotypeTrack, start: u64, end: u64) -> Result<(), EditError> {
    let length = track.length();
    if start < 1 || start > end || end > length {
        return Err(EditError::OutOfRange { chrom: track.chrom().to_string(), start, end, length });
    }
    Ok(())
}
