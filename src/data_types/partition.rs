
use std::ops::Range;

use crate::data_types::segment::{InversionFlag, Segment, SegmentContent};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PartitionError {
    #[error("segment index {index} is out of bounds for a partition with {len} segments")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("boundary {start}-{end} does not overlap segment {segment}")]
    NoOverlap { start: u64, end: u64, segment: String },
    #[error("point segment must cover exactly one position, got {start}-{end}")]
    PointWidth { start: u64, end: u64 },
    #[error("literal segment {segment} cannot be split")]
    LiteralSplit { segment: String },
    #[error("segment {segment} lies outside chromosome range 1-{length}")]
    SegmentOutOfRange { segment: String, length: u64 },
    #[error("literal segment {segment} must cover exactly one position")]
    WideLiteral { segment: String }
}

/// An ordered list of typed segments describing one haplotype-copy of a chromosome.
/// Segments are stored in reference coordinates; a freshly created partition tiles `[1, length]` exactly.
/// Structural edits may repeat coordinates (duplications) or drop them (deletions).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    /// Length of the source chromosome
    length: u64,
    /// The segments, in sequence order
    segments: Vec<Segment>
}

impl Partition {
    /// Creates a content partition that is a single reference pointer over the whole chromosome
    pub fn new_reference(length: u64) -> Self {
        Self {
            length,
            segments: vec![Segment::reference(1, length)]
        }
    }

    /// Creates a copy-number partition with one block over the whole chromosome
    pub fn new_copy_number(length: u64, copy_number: u32) -> Self {
        Self {
            length,
            segments: vec![Segment::copy_number(1, length, copy_number)]
        }
    }

    /// Creates a partition from pre-built segments, verifying each one is well-formed
    /// # Errors
    /// * if any segment fails the checks in `validate()`
    pub fn from_segments(length: u64, segments: Vec<Segment>) -> Result<Self, PartitionError> {
        let partition = Self {
            length, segments
        };
        partition.validate()?;
        Ok(partition)
    }

    /// Splits the segment at `index` by the boundaries `start` and `end`, producing up to three pieces.
    /// Pieces keep the original content; an inversion start flag stays on the left-most piece and an end flag on the right-most piece.
    /// Returns the index range now occupied by the pieces.
    /// # Arguments
    /// * `index` - the segment to split
    /// * `start` - first position of the boundary interval
    /// * `end` - last position of the boundary interval
    /// # Errors
    /// * if `index` is invalid
    /// * if the boundary does not overlap the segment
    /// * if a literal segment would need to be cut
    pub fn split(&mut self, index: usize, start: u64, end: u64) -> Result<Range<usize>, PartitionError> {
        let target = self.get_checked(index)?;
        if !target.overlaps(start, end) {
            return Err(PartitionError::NoOverlap { start, end, segment: target.to_string() });
        }
        if !target.is_split_by(start, end) {
            // boundaries line up with the segment already
            return Ok(index..index+1);
        }
        if matches!(target.content(), SegmentContent::Literal(_)) {
            return Err(PartitionError::LiteralSplit { segment: target.to_string() });
        }

        let mut pieces = vec![];
        let mut piece_start = target.start();
        if start > target.start() {
            pieces.push(target.restrict(piece_start, start - 1));
            piece_start = start;
        }
        if end < target.end() {
            pieces.push(target.restrict(piece_start, end));
            piece_start = end + 1;
        }
        pieces.push(target.restrict(piece_start, target.end()));
        transfer_flags(&mut pieces, target.flag());

        let num_pieces = pieces.len();
        self.segments.splice(index..index+1, pieces);
        Ok(index..index+num_pieces)
    }

    /// Replaces one position of the segment at `index` with a single-position point segment (SNV or insertion).
    /// Produces the left remainder, the point, and the right remainder; remainders that would be empty are omitted.
    /// Inversion flags of the original segment move to whichever piece now sits on that boundary.
    /// Returns the index range now occupied by the pieces.
    /// # Arguments
    /// * `index` - the segment receiving the point
    /// * `point` - the single-position segment
    /// # Errors
    /// * if `index` is invalid
    /// * if `point` is wider than one position
    /// * if the point position is not covered by the target segment
    pub fn insert_point(&mut self, index: usize, point: Segment) -> Result<Range<usize>, PartitionError> {
        if point.start() != point.end() {
            return Err(PartitionError::PointWidth { start: point.start(), end: point.end() });
        }
        let target = self.get_checked(index)?;
        let position = point.start();
        if !target.contains(position) {
            return Err(PartitionError::NoOverlap { start: position, end: position, segment: target.to_string() });
        }

        let mut pieces = vec![];
        if position > target.start() {
            pieces.push(target.restrict(target.start(), position - 1));
        }
        pieces.push(point.with_flag(InversionFlag::None));
        if position < target.end() {
            pieces.push(target.restrict(position + 1, target.end()));
        }
        transfer_flags(&mut pieces, target.flag());

        let num_pieces = pieces.len();
        self.segments.splice(index..index+1, pieces);
        Ok(index..index+num_pieces)
    }

    /// Returns the index of the first segment at or after `from` whose end reaches `position`
    pub fn find_first_ending_at(&self, position: u64, from: usize) -> Option<usize> {
        self.segments.iter()
            .enumerate()
            .skip(from)
            .find(|(_i, s)| s.end() >= position)
            .map(|(i, _s)| i)
    }

    /// Returns the first maximal run of consecutive segments at or after `from` that lie entirely in `[start, end]`
    pub fn find_run_within(&self, start: u64, end: u64, from: usize) -> Option<Range<usize>> {
        let run_start = self.segments.iter()
            .enumerate()
            .skip(from)
            .find(|(_i, s)| s.is_within(start, end))
            .map(|(i, _s)| i)?;
        let run_len = self.segments[run_start..].iter()
            .take_while(|s| s.is_within(start, end))
            .count();
        Some(run_start..run_start+run_len)
    }

    /// Replaces the segments in `range` with `replacement`
    pub fn replace_run(&mut self, range: Range<usize>, replacement: Vec<Segment>) {
        self.segments.splice(range, replacement);
    }

    /// Checks that every segment is well-formed for this chromosome.
    /// # Errors
    /// * if a segment is empty, reversed, or outside `[1, length]`
    /// * if a literal segment covers more than one position
    pub fn validate(&self) -> Result<(), PartitionError> {
        for segment in self.segments.iter() {
            if segment.start() < 1 || segment.start() > segment.end() || segment.end() > self.length {
                return Err(PartitionError::SegmentOutOfRange { segment: segment.to_string(), length: self.length });
            }
            if matches!(segment.content(), SegmentContent::Literal(_)) && segment.span() != 1 {
                return Err(PartitionError::WideLiteral { segment: segment.to_string() });
            }
        }
        Ok(())
    }

    /// Returns true if the segments are contiguous, sorted, and cover exactly `[1, length]`.
    /// This holds until a structural edit repeats or removes coordinates.
    pub fn is_exact_tiling(&self) -> bool {
        let mut expected_start = 1;
        for segment in self.segments.iter() {
            if segment.start() != expected_start || segment.end() < segment.start() {
                return false;
            }
            expected_start = segment.end() + 1;
        }
        expected_start == self.length + 1
    }

    /// Total number of bases this partition produces once materialized
    pub fn materialized_len(&self) -> u64 {
        self.segments.iter()
            .map(|s| s.materialized_len())
            .sum()
    }

    /// Helper that fetches a segment or returns an index error
    fn get_checked(&self, index: usize) -> Result<&Segment, PartitionError> {
        self.segments.get(index)
            .ok_or(PartitionError::IndexOutOfBounds { index, len: self.segments.len() })
    }

    // getters
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Moves the flag of a segment that was cut into `pieces` onto the outermost pieces.
/// A lone piece keeps the flag unchanged.
fn transfer_flags(pieces: &mut [Segment], original: InversionFlag) {
    let num_pieces = pieces.len();
    if num_pieces == 1 {
        pieces[0].set_flag(original);
        return;
    }
    if original.opens_inversion() {
        pieces[0].set_flag(InversionFlag::Start);
    }
    if original.closes_inversion() {
        pieces[num_pieces - 1].set_flag(InversionFlag::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinates(partition: &Partition) -> Vec<(u64, u64)> {
        partition.segments().iter()
            .map(|s| (s.start(), s.end()))
            .collect()
    }

    fn flags(partition: &Partition) -> Vec<InversionFlag> {
        partition.segments().iter()
            .map(|s| s.flag())
            .collect()
    }

    #[test]
    fn test_new_partitions() {
        let content = Partition::new_reference(100);
        assert_eq!(content.len(), 1);
        assert!(content.is_exact_tiling());
        assert_eq!(content.materialized_len(), 100);

        let cn = Partition::new_copy_number(100, 1);
        assert_eq!(cn.segments()[0].copy_number_value(), Some(1));
        assert!(cn.is_exact_tiling());
        assert_eq!(cn.materialized_len(), 0);
    }

    #[test]
    fn test_split_three_pieces() {
        let mut partition = Partition::new_reference(100);
        let range = partition.split(0, 10, 20).unwrap();
        assert_eq!(range, 0..3);
        assert_eq!(coordinates(&partition), vec![(1, 9), (10, 20), (21, 100)]);
        assert!(partition.is_exact_tiling());
        assert!(partition.segments().iter().all(|s| s.content() == &SegmentContent::Reference));
    }

    #[test]
    fn test_split_one_side() {
        // only the start cuts
        let mut partition = Partition::new_reference(100);
        let range = partition.split(0, 50, 150).unwrap();
        assert_eq!(range, 0..2);
        assert_eq!(coordinates(&partition), vec![(1, 49), (50, 100)]);

        // only the end cuts
        let mut partition = Partition::new_reference(100);
        let range = partition.split(0, 1, 30).unwrap();
        assert_eq!(range, 0..2);
        assert_eq!(coordinates(&partition), vec![(1, 30), (31, 100)]);

        // exact match is a no-op
        let mut partition = Partition::new_reference(100);
        let range = partition.split(0, 1, 100).unwrap();
        assert_eq!(range, 0..1);
        assert_eq!(coordinates(&partition), vec![(1, 100)]);
    }

    #[test]
    fn test_split_no_overlap() {
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 50), Segment::reference(51, 100)
        ]).unwrap();
        let result = partition.split(1, 10, 20);
        assert!(matches!(result, Err(PartitionError::NoOverlap { .. })));
        let result = partition.split(5, 10, 20);
        assert!(matches!(result, Err(PartitionError::IndexOutOfBounds { index: 5, len: 2 })));
    }

    #[test]
    fn test_split_flags() {
        // single-segment inversion cut in three keeps both boundaries
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Single)
        ]).unwrap();
        partition.split(0, 10, 20).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::None, InversionFlag::End]);

        // single-segment inversion cut in two
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Single)
        ]).unwrap();
        partition.split(0, 10, 200).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::End]);

        // end flag stays at the right edge even when only the start cuts
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::End)
        ]).unwrap();
        partition.split(0, 10, 200).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::None, InversionFlag::End]);

        // start flag stays at the left edge
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Start)
        ]).unwrap();
        partition.split(0, 1, 40).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::None]);
    }

    #[test]
    fn test_split_literal() {
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 49), Segment::literal(50, b"T".to_vec()), Segment::reference(51, 100)
        ]).unwrap();
        // a literal is a single position, so anything overlapping it lines up
        assert_eq!(partition.split(1, 50, 60).unwrap(), 1..2);
        assert_eq!(partition.split(1, 40, 50).unwrap(), 1..2);
    }

    #[test]
    fn test_insert_point_middle() {
        let mut partition = Partition::new_reference(100);
        let range = partition.insert_point(0, Segment::literal(50, b"T".to_vec())).unwrap();
        assert_eq!(range, 0..3);
        assert_eq!(coordinates(&partition), vec![(1, 49), (50, 50), (51, 100)]);
        assert_eq!(partition.segments()[1].content(), &SegmentContent::Literal(b"T".to_vec()));
        assert!(partition.is_exact_tiling());
    }

    #[test]
    fn test_insert_point_edges() {
        let mut partition = Partition::new_reference(100);
        let range = partition.insert_point(0, Segment::literal(1, b"G".to_vec())).unwrap();
        assert_eq!(range, 0..2);
        assert_eq!(coordinates(&partition), vec![(1, 1), (2, 100)]);

        let range = partition.insert_point(1, Segment::literal(100, b"GAT".to_vec())).unwrap();
        assert_eq!(range, 1..3);
        assert_eq!(coordinates(&partition), vec![(1, 1), (2, 99), (100, 100)]);
        assert!(partition.is_exact_tiling());
        assert_eq!(partition.materialized_len(), 102);
    }

    #[test]
    fn test_insert_point_flags() {
        // point on the start of a single inversion
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Single)
        ]).unwrap();
        partition.insert_point(0, Segment::literal(1, b"A".to_vec())).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::End]);

        // point on the end of a single inversion
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Single)
        ]).unwrap();
        partition.insert_point(0, Segment::literal(100, b"A".to_vec())).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::End]);

        // point in the middle of a start flagged block
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 100).with_flag(InversionFlag::Start)
        ]).unwrap();
        partition.insert_point(0, Segment::literal(30, b"A".to_vec())).unwrap();
        assert_eq!(flags(&partition), vec![InversionFlag::Start, InversionFlag::None, InversionFlag::None]);

        // point replacing a whole one-base block inherits its flag
        let mut partition = Partition::from_segments(3, vec![
            Segment::reference(1, 1), Segment::reference(2, 2).with_flag(InversionFlag::Single), Segment::reference(3, 3)
        ]).unwrap();
        partition.insert_point(1, Segment::literal(2, b"C".to_vec())).unwrap();
        assert_eq!(partition.len(), 3);
        assert_eq!(partition.segments()[1].flag(), InversionFlag::Single);
        assert_eq!(partition.segments()[1].content(), &SegmentContent::Literal(b"C".to_vec()));
    }

    #[test]
    fn test_insert_point_errors() {
        let mut partition = Partition::from_segments(100, vec![
            Segment::reference(1, 50), Segment::reference(51, 100)
        ]).unwrap();
        let result = partition.insert_point(0, Segment::literal(60, b"A".to_vec()));
        assert!(matches!(result, Err(PartitionError::NoOverlap { .. })));
        let result = partition.insert_point(0, Segment::reference(10, 11));
        assert!(matches!(result, Err(PartitionError::PointWidth { start: 10, end: 11 })));
    }

    #[test]
    fn test_find_helpers() {
        let partition = Partition::from_segments(100, vec![
            Segment::reference(1, 9), Segment::reference(10, 20), Segment::reference(10, 20), Segment::reference(21, 100)
        ]).unwrap();
        assert_eq!(partition.find_first_ending_at(15, 0), Some(1));
        assert_eq!(partition.find_first_ending_at(15, 2), Some(2));
        assert_eq!(partition.find_first_ending_at(101, 0), None);

        // consecutive copies inside the range form one run
        assert_eq!(partition.find_run_within(10, 20, 0), Some(1..3));
        assert_eq!(partition.find_run_within(10, 20, 2), Some(2..3));
        assert_eq!(partition.find_run_within(10, 15, 0), None);
        assert_eq!(partition.find_run_within(1, 20, 0), Some(0..3));
        assert_eq!(partition.find_run_within(30, 40, 0), None);
    }

    #[test]
    fn test_validate() {
        assert!(Partition::from_segments(100, vec![Segment::reference(1, 101)]).is_err());
        assert!(Partition::from_segments(100, vec![Segment::reference(0, 10)]).is_err());
        assert!(Partition::from_segments(100, vec![Segment::reference(20, 10)]).is_err());
        assert!(Partition::from_segments(100, vec![Segment::new(1, 2, SegmentContent::Literal(b"A".to_vec()))]).is_err());

        // duplicated coordinates are valid but no longer an exact tiling
        let partition = Partition::from_segments(100, vec![
            Segment::reference(1, 20), Segment::reference(10, 100)
        ]).unwrap();
        assert!(!partition.is_exact_tiling());
    }
}
