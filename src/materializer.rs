/*!
# Materializer
Converts a content partition back into bases.
Inverted blocks are collected on a stack of buffers, and each block is reverse-complemented into its parent when its end flag is reached.
Nested inversions are resolved innermost first.
*/

use crate::data_types::partition::Partition;
use crate::data_types::segment::{Segment, SegmentContent};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MaterializeError {
    #[error("segment {segment} is outside the reference sequence (length {length})")]
    ReferenceRange { segment: String, length: usize },
    #[error("copy-number segment {segment} has no sequence")]
    CopyNumberContent { segment: String },
    #[error("inversion end at segment {segment} has no matching start")]
    UnmatchedEnd { segment: String },
    #[error("{open} inversion(s) are still open after the last segment")]
    UnclosedInversion { open: usize },
    #[error("cannot complement base {base:?}")]
    InvalidBase { base: char }
}

/// Builds the sequence described by `partition`
/// # Arguments
/// * `partition` - the content partition of one haplotype
/// * `reference` - the full chromosome sequence, indexed from position 1
/// # Errors
/// * if a reference segment falls outside `reference`
/// * if the partition holds copy-number segments
/// * if the inversion flags are unbalanced
/// * if an inverted block contains a base without a complement
pub fn materialize(partition: &Partition, reference: &[u8]) -> Result<Vec<u8>, MaterializeError> {
    let mut stack: Vec<Vec<u8>> = vec![Vec::with_capacity(partition.materialized_len() as usize)];
    for segment in partition.segments().iter() {
        if segment.flag().opens_inversion() {
            stack.push(vec![]);
        }

        let bases = resolve(segment, reference)?;
        // stack always holds the root buffer here
        if let Some(top) = stack.last_mut() {
            top.extend_from_slice(bases);
        }

        if segment.flag().closes_inversion() {
            if stack.len() < 2 {
                return Err(MaterializeError::UnmatchedEnd { segment: segment.to_string() });
            }
            let block = stack.pop().unwrap_or_default();
            let inverted = reverse_complement(&block)?;
            if let Some(parent) = stack.last_mut() {
                parent.extend(inverted);
            }
        }
    }

    if stack.len() != 1 {
        return Err(MaterializeError::UnclosedInversion { open: stack.len() - 1 });
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Reverse-complements a sequence, preserving case.
/// Supports ACGTN and the IUPAC ambiguity codes.
/// # Errors
/// * if a base has no known complement
pub fn reverse_complement(sequence: &[u8]) -> Result<Vec<u8>, MaterializeError> {
    sequence.iter()
        .rev()
        .map(|&b| complement(b).ok_or(MaterializeError::InvalidBase { base: b as char }))
        .collect()
}

fn complement(base: u8) -> Option<u8> {
    let upper = match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'N' => b'N',
        b'R' => b'Y',
        b'Y' => b'R',
        b'S' => b'S',
        b'W' => b'W',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        _ => return None
    };
    if base.is_ascii_lowercase() {
        Some(upper.to_ascii_lowercase())
    } else {
        Some(upper)
    }
}

/// Returns the bases a single segment contributes
fn resolve<'a>(segment: &'a Segment, reference: &'a [u8]) -> Result<&'a [u8], MaterializeError> {
    match segment.content() {
        SegmentContent::Reference => {
            let start = segment.start() as usize;
            let end = segment.end() as usize;
            if start < 1 || end > reference.len() || start > end {
                return Err(MaterializeError::ReferenceRange { segment: segment.to_string(), length: reference.len() });
            }
            Ok(&reference[start-1..end])
        },
        SegmentContent::Literal(bases) => Ok(bases),
        SegmentContent::CopyNumber(_) => Err(MaterializeError::CopyNumberContent { segment: segment.to_string() })
    }
}
