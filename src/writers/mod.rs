/*!
# Writers module
Contains the logic for writing the output files for the incorporate command.
*/
/// Optional dump of the final content partitions
pub mod block_dump;
/// Combined copy-number report
pub mod cnv_report;
/// Per-haplotype FASTA sequences
pub mod fasta;
/// Combined variant calls with allele frequencies
pub mod vcf_report;

use derive_builder::Builder;
use std::path::PathBuf;

/// Naming scheme for every file a run produces
#[derive(Builder, Clone, Debug, Default)]
#[builder(default, setter(into))]
pub struct OutputLayout {
    /// Folder receiving all outputs
    directory: PathBuf,
    /// Prefix for every filename
    prefix: String,
    /// Clone name
    clone_name: String,
    /// Appended to the report filenames when a single chromosome was requested; empty otherwise
    chromosome_tag: String
}

impl OutputLayout {
    /// `<prefix><clone><tag>cnv.txt`
    pub fn cnv_filename(&self) -> PathBuf {
        self.report_filename("cnv.txt")
    }

    /// `<prefix><clone><tag>.vcf`
    pub fn vcf_filename(&self) -> PathBuf {
        self.report_filename(".vcf")
    }

    /// `<prefix><clone><tag>blocks.txt`
    pub fn blocks_filename(&self) -> PathBuf {
        self.report_filename("blocks.txt")
    }

    /// `<prefix><clone><chrom><hap>.fasta`
    pub fn fasta_filename(&self, chrom: &str, haplotype: &str) -> PathBuf {
        self.directory.join(format!("{}{}{chrom}{haplotype}.fasta", self.prefix, self.clone_name))
    }

    /// Name of one haplotype in FASTA headers and block dumps, `<clone>_<chrom>_<hap>`
    pub fn haplotype_name(&self, chrom: &str, haplotype: &str) -> String {
        format!("{}_{chrom}_{haplotype}", self.clone_name)
    }

    fn report_filename(&self, suffix: &str) -> PathBuf {
        self.directory.join(format!("{}{}{}{suffix}", self.prefix, self.clone_name, self.chromosome_tag))
    }

    // getters
    pub fn clone_name(&self) -> &str {
        &self.clone_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let layout = OutputLayoutBuilder::default()
            .directory("/out")
            .prefix("run1_")
            .clone_name("clone2")
            .build().unwrap();
        assert_eq!(layout.cnv_filename(), PathBuf::from("/out/run1_clone2cnv.txt"));
        assert_eq!(layout.vcf_filename(), PathBuf::from("/out/run1_clone2.vcf"));
        assert_eq!(layout.blocks_filename(), PathBuf::from("/out/run1_clone2blocks.txt"));
        assert_eq!(layout.fasta_filename("chr1", "A1"), PathBuf::from("/out/run1_clone2chr1A1.fasta"));
        assert_eq!(layout.haplotype_name("chr1", "A1"), "clone2_chr1_A1");
        assert_eq!(layout.clone_name(), "clone2");

        let layout = OutputLayoutBuilder::default()
            .directory("/out")
            .clone_name("clone2")
            .chromosome_tag("chr3")
            .build().unwrap();
        assert_eq!(layout.cnv_filename(), PathBuf::from("/out/clone2chr3cnv.txt"));
        assert_eq!(layout.vcf_filename(), PathBuf::from("/out/clone2chr3.vcf"));
        // FASTA names already carry the chromosome
        assert_eq!(layout.fasta_filename("chr3", "B"), PathBuf::from("/out/clone2chr3B.fasta"));
    }
}
