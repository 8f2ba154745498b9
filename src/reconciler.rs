/*!
# Reconciler
Merges the per-haplotype results of one chromosome.
* `combine_cnvs` - sums the copy-number partitions into total, lineage A, and lineage B reports sharing the same block boundaries
* `combine_vcfs` - merges the variant records of every haplotype into one call per position with an allele frequency
*/
use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::data_types::combined::{CombinedCnvBlock, CombinedCnvs, CombinedVariantCall, Lineage};
use crate::data_types::partition::Partition;
use crate::data_types::variant_record::VariantRecord;
use crate::haplotype_track::HaplotypeTrack;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("copy-number partition of haplotype {label} contains non copy-number segment {segment}")]
    NotCopyNumber { label: String, segment: String },
    #[error("no combined copy-number block covers position {position}")]
    UncoveredPosition { position: u64 },
    #[error("variant at position {position} has {total_copies} surviving copies but a copy number of 0")]
    ZeroCopyNumber { position: u64, total_copies: u64 },
    #[error("variant at position {position} of haplotype {label} has no final copy count")]
    Unfinalized { label: String, position: u64 }
}

/// Index of each report in the running sums
const ALL: usize = 0;
const LINEAGE_A: usize = 1;
const LINEAGE_B: usize = 2;

/// Sums copy-number partitions into the combined reports.
/// Every report starts from a zero background over `[1, length]`, so all three tile the chromosome and share boundaries.
/// # Arguments
/// * `length` - chromosome length
/// * `partitions` - (haplotype label, copy-number partition) pairs; the label decides the lineage
/// # Errors
/// * if a partition contains anything but copy-number segments
pub fn combine_cnvs<'a>(length: u64, partitions: impl IntoIterator<Item = (&'a str, &'a Partition)>) -> Result<CombinedCnvs, ReconcileError> {
    // position -> change in copy number for each report when entering that position
    let mut deltas: BTreeMap<u64, [i64; 3]> = BTreeMap::new();
    deltas.insert(1, [0; 3]);
    deltas.insert(length + 1, [0; 3]);

    for (label, partition) in partitions.into_iter() {
        let group = match Lineage::from_label(label) {
            Lineage::A => LINEAGE_A,
            Lineage::B => LINEAGE_B
        };
        for segment in partition.segments().iter() {
            let copy_number = segment.copy_number_value()
                .ok_or_else(|| ReconcileError::NotCopyNumber { label: label.to_string(), segment: segment.to_string() })?;
            let copy_number = copy_number as i64;

            let entering = deltas.entry(segment.start()).or_default();
            entering[ALL] += copy_number;
            entering[group] += copy_number;
            let leaving = deltas.entry(segment.end() + 1).or_default();
            leaving[ALL] -= copy_number;
            leaving[group] -= copy_number;
        }
    }

    let mut combined = CombinedCnvs::default();
    let mut running = [0i64; 3];
    let breakpoints: Vec<(u64, [i64; 3])> = deltas.into_iter().collect();
    for window in breakpoints.windows(2) {
        let (start, delta) = window[0];
        let (next_start, _) = window[1];
        for (total, change) in running.iter_mut().zip(delta.iter()) {
            *total += change;
        }
        if start > length {
            break;
        }

        let block = |index: usize| CombinedCnvBlock {
            start,
            end: next_start - 1,
            copy_number: running[index].max(0) as u64
        };
        combined.all.push(block(ALL));
        combined.lineage_a.push(block(LINEAGE_A));
        combined.lineage_b.push(block(LINEAGE_B));
    }
    Ok(combined)
}

/// Merges the finalized variant records of every haplotype.
/// Within a haplotype a later record at the same position replaces the earlier one.
/// Rows follow first appearance across haplotypes; REF and ALT come from the first haplotype reporting the position.
/// Positions where no copy survives are dropped.
/// # Arguments
/// * `tracks` - all haplotype tracks of one chromosome, after `finalize_counts()`
/// * `cnvs` - the combined copy-number reports of the same chromosome
/// # Errors
/// * if a record was never finalized
/// * if no total copy-number block covers a surviving variant
/// * if a surviving variant sits in a block with copy number 0
pub fn combine_vcfs(tracks: &[HaplotypeTrack], cnvs: &CombinedCnvs) -> Result<Vec<CombinedVariantCall>, ReconcileError> {
    let mut merged: IndexMap<u64, (&VariantRecord, Vec<(String, u64)>)> = IndexMap::new();
    for track in tracks.iter() {
        let mut latest: IndexMap<u64, &VariantRecord> = IndexMap::new();
        for record in track.variants().iter() {
            latest.insert(record.position(), record);
        }

        for (position, record) in latest.into_iter() {
            let count = record.final_copy_count()
                .ok_or_else(|| ReconcileError::Unfinalized { label: track.label().to_string(), position })?;
            merged.entry(position)
                .or_insert_with(|| (record, vec![]))
                .1.push((track.label().to_string(), count));
        }
    }

    let mut calls = vec![];
    for (position, (first_record, haplotype_counts)) in merged.into_iter() {
        let total_copies: u64 = haplotype_counts.iter().map(|(_label, count)| count).sum();
        if total_copies == 0 {
            continue;
        }

        let copy_number = cnvs.find_block(position)
            .ok_or(ReconcileError::UncoveredPosition { position })?
            .copy_number;
        if copy_number == 0 {
            return Err(ReconcileError::ZeroCopyNumber { position, total_copies });
        }

        calls.push(CombinedVariantCall {
            position,
            reference: first_record.reference().to_vec(),
            alternate: first_record.alternate().to_vec(),
            allele_frequency: round_frequency(total_copies as f64 / copy_number as f64),
            total_copies,
            haplotype_counts,
            copy_number
        });
    }
    Ok(calls)
}

/// Rounds to 5 decimal places
pub fn round_frequency(value: f64) -> f64 {
    format!("{value:.5}").parse().unwrap_or(value)
}
