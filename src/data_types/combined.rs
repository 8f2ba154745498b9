
/// Parental lineage of a haplotype, used for allele-specific copy number
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Lineage {
    A,
    B
}

impl Lineage {
    /// Labels starting with "A" belong to lineage A, everything else is B
    pub fn from_label(haplotype_label: &str) -> Self {
        if haplotype_label.starts_with('A') {
            Lineage::A
        } else {
            Lineage::B
        }
    }
}

/// Chromosome-level copy number over `[start, end]`, summed across haplotypes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CombinedCnvBlock {
    pub start: u64,
    pub end: u64,
    pub copy_number: u64
}

impl CombinedCnvBlock {
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// The three copy-number reports for one chromosome; all three share identical block boundaries
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CombinedCnvs {
    /// Total copy number
    pub all: Vec<CombinedCnvBlock>,
    /// Copy number contributed by lineage A haplotypes
    pub lineage_a: Vec<CombinedCnvBlock>,
    /// Copy number contributed by lineage B haplotypes
    pub lineage_b: Vec<CombinedCnvBlock>
}

impl CombinedCnvs {
    /// Finds the total copy number block covering `position`.
    /// Blocks are sorted and non-overlapping, so this is a binary search.
    pub fn find_block(&self, position: u64) -> Option<&CombinedCnvBlock> {
        let index = self.all.partition_point(|b| b.end < position);
        self.all.get(index)
            .filter(|b| b.contains(position))
    }
}

/// One reported variant after merging all haplotypes of a chromosome
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedVariantCall {
    /// 1-based position
    pub position: u64,
    /// Reference allele from the first haplotype reporting the position
    pub reference: Vec<u8>,
    /// Alternate allele from the first haplotype reporting the position
    pub alternate: Vec<u8>,
    /// total_copies / copy_number, rounded to 5 decimals
    pub allele_frequency: f64,
    /// Surviving copies summed over haplotypes
    pub total_copies: u64,
    /// Per haplotype (label, surviving copies), in haplotype order
    pub haplotype_counts: Vec<(String, u64)>,
    /// Total copy number at the position
    pub copy_number: u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage() {
        assert_eq!(Lineage::from_label("A"), Lineage::A);
        assert_eq!(Lineage::from_label("A12"), Lineage::A);
        assert_eq!(Lineage::from_label("B1"), Lineage::B);
        assert_eq!(Lineage::from_label("C"), Lineage::B);
    }

    #[test]
    fn test_find_block() {
        let cnvs = CombinedCnvs {
            all: vec![
                CombinedCnvBlock { start: 1, end: 9, copy_number: 2 },
                CombinedCnvBlock { start: 10, end: 20, copy_number: 3 },
                CombinedCnvBlock { start: 21, end: 100, copy_number: 2 },
            ],
            ..Default::default()
        };
        assert_eq!(cnvs.find_block(1).unwrap().copy_number, 2);
        assert_eq!(cnvs.find_block(10).unwrap().copy_number, 3);
        assert_eq!(cnvs.find_block(20).unwrap().copy_number, 3);
        assert_eq!(cnvs.find_block(100).unwrap().start, 21);
        assert!(cnvs.find_block(0).is_none());
        assert!(cnvs.find_block(101).is_none());
    }
}
