
/// What a segment resolves to when it is read back out
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SegmentContent {
    /// Pointer into the chromosome reference, sliced by the segment coordinates
    Reference,
    /// Literal bases that replace the covered coordinates; may be empty
    Literal(Vec<u8>),
    /// Local copy number, only used in copy-number partitions
    CopyNumber(u32)
}

impl std::fmt::Display for SegmentContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentContent::Reference => write!(f, "ref"),
            SegmentContent::Literal(bases) => write!(f, "{}", String::from_utf8_lossy(bases)),
            SegmentContent::CopyNumber(cn) => write!(f, "{cn}")
        }
    }
}

/// Marks a segment as the boundary of a reverse-complemented block
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, strum_macros::Display)]
pub enum InversionFlag {
    /// Regular forward segment
    #[default]
    #[strum(serialize = "")]
    None,
    /// First segment of an inverted block
    #[strum(serialize = "s")]
    Start,
    /// Last segment of an inverted block
    #[strum(serialize = "e")]
    End,
    /// The inverted block is exactly this one segment
    #[strum(serialize = "se")]
    Single
}

impl InversionFlag {
    /// Returns true if an inverted block begins at this segment
    pub fn opens_inversion(&self) -> bool {
        match self {
            InversionFlag::Start |
            InversionFlag::Single => true,
            InversionFlag::None |
            InversionFlag::End => false
        }
    }

    /// Returns true if an inverted block finishes at this segment
    pub fn closes_inversion(&self) -> bool {
        match self {
            InversionFlag::End |
            InversionFlag::Single => true,
            InversionFlag::None |
            InversionFlag::Start => false
        }
    }
}

/// A typed interval in reference coordinates.
/// Coordinates are 1-based and inclusive.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    /// First covered reference position
    start: u64,
    /// Last covered reference position
    end: u64,
    /// What the segment resolves to
    content: SegmentContent,
    /// Inversion boundary marker
    flag: InversionFlag
}

impl Segment {
    /// General constructor, no flag set
    pub fn new(start: u64, end: u64, content: SegmentContent) -> Self {
        Self {
            start, end, content,
            flag: InversionFlag::None
        }
    }

    /// Creates a reference-pointer segment over `[start, end]`
    pub fn reference(start: u64, end: u64) -> Self {
        Self::new(start, end, SegmentContent::Reference)
    }

    /// Creates a single-position segment holding literal bases, e.g. an SNV or insertion
    pub fn literal(position: u64, bases: Vec<u8>) -> Self {
        Self::new(position, position, SegmentContent::Literal(bases))
    }

    /// Creates a copy-number segment over `[start, end]`
    pub fn copy_number(start: u64, end: u64, copy_number: u32) -> Self {
        Self::new(start, end, SegmentContent::CopyNumber(copy_number))
    }

    /// Builder-style flag override
    pub fn with_flag(mut self, flag: InversionFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn set_flag(&mut self, flag: InversionFlag) {
        self.flag = flag;
    }

    /// Copies this segment onto new coordinates, dropping the flag
    pub fn restrict(&self, start: u64, end: u64) -> Self {
        Self::new(start, end, self.content.clone())
    }

    /// Returns true if `[start, end]` shares at least one position with this segment
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start <= self.end && end >= self.start
    }

    /// Returns true if this segment sits completely inside `[start, end]`
    pub fn is_within(&self, start: u64, end: u64) -> bool {
        self.start >= start && self.end <= end
    }

    /// Returns true if the position is covered by this segment
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Returns true if either boundary of `[start, end]` falls strictly inside this segment, i.e. a split would change it
    pub fn is_split_by(&self, start: u64, end: u64) -> bool {
        if !self.overlaps(start, end) {
            return false;
        }
        (start > self.start && start <= self.end) ||
            (end >= self.start && end < self.end)
    }

    /// Number of reference positions covered
    pub fn span(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Number of bases this segment contributes once materialized
    pub fn materialized_len(&self) -> u64 {
        match &self.content {
            SegmentContent::Reference => self.span(),
            SegmentContent::Literal(bases) => bases.len() as u64,
            SegmentContent::CopyNumber(_) => 0
        }
    }

    // getters
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn content(&self) -> &SegmentContent {
        &self.content
    }

    pub fn flag(&self) -> InversionFlag {
        self.flag
    }

    /// Copy number value, if this is a copy-number segment
    pub fn copy_number_value(&self) -> Option<u32> {
        match self.content {
            SegmentContent::CopyNumber(cn) => Some(cn),
            _ => None
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BLOCK: {}-{}, {}, {}", self.start, self.end, self.content, self.flag)
    }
}
