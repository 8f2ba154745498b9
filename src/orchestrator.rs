/*!
# Orchestrator
Runs one clone end to end: builds every haplotype track, reconciles each chromosome, and writes all outputs.
Chromosomes are processed in parallel, and so are the haplotypes within a chromosome.
*/
use anyhow::Context;
use indicatif::ParallelProgressIterator;
use log::{info, trace};
use rayon::prelude::*;
use std::path::Path;

use crate::data_types::combined::{CombinedCnvs, CombinedVariantCall};
use crate::data_types::edit_event::EditEvent;
use crate::haplotype_track::HaplotypeTrack;
use crate::materializer::MaterializeError;
use crate::parsing::edit_script::CloneScript;
use crate::parsing::reference::ReferenceContext;
use crate::reconciler::{combine_cnvs, combine_vcfs};
use crate::util::progress_bar::get_progress_style;
use crate::writers::OutputLayout;
use crate::writers::block_dump::write_block_dump;
use crate::writers::cnv_report::write_cnv_report;
use crate::writers::fasta::write_fasta_file;
use crate::writers::vcf_report::write_vcf_report;

/// Everything computed for one chromosome of a clone
#[derive(Clone, Debug)]
pub struct ChromosomeResult {
    /// Chromosome name
    chrom: String,
    /// One finished track per haplotype, in script order
    tracks: Vec<HaplotypeTrack>,
    /// Combined copy number reports
    cnvs: CombinedCnvs,
    /// Combined variant calls
    calls: Vec<CombinedVariantCall>
}

impl ChromosomeResult {
    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn tracks(&self) -> &[HaplotypeTrack] {
        &self.tracks
    }

    pub fn cnvs(&self) -> &CombinedCnvs {
        &self.cnvs
    }

    pub fn calls(&self) -> &[CombinedVariantCall] {
        &self.calls
    }
}

/// Applies every inherited event to a fresh track and finalizes its variant counts
/// # Errors
/// * if any event fails to apply
pub fn build_haplotype_track(chrom: &str, label: &str, length: u64, events: &[EditEvent]) -> anyhow::Result<HaplotypeTrack> {
    let mut track = HaplotypeTrack::new(chrom.to_string(), label.to_string(), length);
    track.apply_events(events.iter())
        .with_context(|| format!("Error while applying events to {chrom}{label}:"))?;
    track.finalize_counts();
    trace!(
        "{chrom}{label}: {} content segments, {} copy number segments, {} variants",
        track.content().len(), track.copy_number().len(), track.variants().len()
    );
    info!("Processed mutations for {chrom}{label}");
    Ok(track)
}

/// Builds all haplotypes of one chromosome and reconciles them
/// # Errors
/// * if the chromosome has no haplotypes listed in the script
/// * if any track fails to build
/// * if the reconciliation finds inconsistent copy numbers
pub fn process_chromosome(chrom: &str, length: u64, script: &CloneScript) -> anyhow::Result<ChromosomeResult> {
    let labels = script.haplotypes_for(chrom)?;
    let tracks: Vec<HaplotypeTrack> = labels.par_iter()
        .map(|label| build_haplotype_track(chrom, label, length, script.events()))
        .collect::<anyhow::Result<_>>()?;

    let cnvs = combine_cnvs(length, tracks.iter().map(|t| (t.label(), t.copy_number())))
        .with_context(|| format!("Error while combining copy numbers for {chrom}:"))?;
    info!("Calculated copy numbers for {chrom}");

    let calls = combine_vcfs(&tracks, &cnvs)
        .with_context(|| format!("Error while combining variants for {chrom}:"))?;
    info!("Calculated variant allele frequencies for {chrom}");

    Ok(ChromosomeResult {
        chrom: chrom.to_string(),
        tracks, cnvs, calls
    })
}

/// Processes every selected chromosome, returning the results in reference index order
/// # Errors
/// * if any chromosome fails, see `process_chromosome(...)`
pub fn run_clone(reference: &ReferenceContext, script: &CloneScript) -> anyhow::Result<Vec<ChromosomeResult>> {
    let chromosomes: Vec<(&str, u64)> = reference.lengths().iter()
        .map(|(chrom, &length)| (chrom.as_str(), length))
        .collect();

    let style = get_progress_style();
    chromosomes.into_par_iter()
        .map(|(chrom, length)| process_chromosome(chrom, length, script))
        .progress_with_style(style)
        .collect()
}

/// Writes the reports, the optional block dump, and one FASTA per haplotype
/// # Arguments
/// * `results` - the per-chromosome results, in output order
/// * `reference` - the loaded reference, used to build the sequences
/// * `layout` - output naming
/// * `reference_fn` - reference path recorded in the VCF header
/// * `output_blocks` - if true, also write the block dump
/// # Errors
/// * if any output fails to write
/// * if any haplotype sequence cannot be built
pub fn write_outputs(results: &[ChromosomeResult], reference: &ReferenceContext, layout: &OutputLayout, reference_fn: &Path, output_blocks: bool) -> anyhow::Result<()> {
    write_cnv_report(&layout.cnv_filename(), results.iter().map(|r| (r.chrom(), r.cnvs())))?;
    info!("Written copy numbers file");

    write_vcf_report(
        &layout.vcf_filename(), layout.clone_name(), reference_fn,
        results.iter().map(|r| (r.chrom(), r.calls()))
    )?;
    info!("Written vcf file");

    if output_blocks {
        write_block_dump(&layout.blocks_filename(), layout, results.iter().flat_map(|r| r.tracks().iter()))?;
        info!("Written blocks file");
    }

    results.par_iter()
        .flat_map(|r| r.tracks().par_iter())
        .try_for_each(|track| {
            let chrom = track.chrom();
            let label = track.label();
            let sequence = track.materialize(reference.sequence(chrom))
                .with_context(|| format!("Error while building sequence for {chrom}{label}:"))?;
            write_fasta_file(&layout.fasta_filename(chrom, label), &layout.haplotype_name(chrom, label), &sequence)?;
            info!("Written fasta sequence for {chrom}{label}");
            Ok(())
        })
}

/// Picks the exit code for a failed `write_outputs(...)`: a haplotype that cannot be built is an internal error, anything else is I/O
pub fn output_exit_code(error: &anyhow::Error) -> exitcode::ExitCode {
    if error.downcast_ref::<MaterializeError>().is_some() {
        exitcode::SOFTWARE
    } else {
        exitcode::IOERR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::OutputLayoutBuilder;
    use approx_eq::assert_approx_eq;
    use std::path::PathBuf;

    fn load_test_inputs() -> (ReferenceContext, CloneScript) {
        let chromosomes = vec!["chr1".to_string(), "chr2".to_string()];
        let reference = ReferenceContext::load(Path::new("./test_data/ref.fa"), &chromosomes, false).unwrap();
        let script = CloneScript::load(Path::new("./test_data/test_variants.json"), "clone1").unwrap();
        (reference, script)
    }

    /// Scratch folder under the system temp directory, cleared before use
    fn scratch_folder(name: &str) -> PathBuf {
        let folder = std::env::temp_dir().join(format!("hapsmith_{name}_{}", std::process::id()));
        if folder.exists() {
            std::fs::remove_dir_all(&folder).unwrap();
        }
        std::fs::create_dir_all(&folder).unwrap();
        folder
    }

    #[test]
    fn test_build_haplotype_track() {
        let script = CloneScript::from_value("c", &serde_json::json!([
            [["snv", "chr1", "A", 50, "A", "T"]],
            {"chr1": ["A"]}
        ])).unwrap();
        let track = build_haplotype_track("chr1", "A", 100, script.events()).unwrap();
        assert_eq!(track.variants()[0].final_copy_count(), Some(1));

        let bad_script = CloneScript::from_value("c", &serde_json::json!([
            [["snv", "chr1", "A", 150, "A", "T"]],
            {"chr1": ["A"]}
        ])).unwrap();
        assert!(build_haplotype_track("chr1", "A", 100, bad_script.events()).is_err());
    }

    #[test]
    fn test_process_chromosome() {
        let script = CloneScript::from_value("c", &serde_json::json!([
            [
                ["snv", "chr1", "A", 50, "A", "T"],
                ["cnv", "chr1", "A", 1, 60, 2, [0, 0]]
            ],
            {"chr1": ["A", "B"]}
        ])).unwrap();
        let result = process_chromosome("chr1", 100, &script).unwrap();
        assert_eq!(result.chrom(), "chr1");
        assert_eq!(result.tracks().len(), 2);
        assert_eq!(result.cnvs().find_block(25).unwrap().copy_number, 3);
        assert_eq!(result.cnvs().lineage_a[0].copy_number, 2);
        assert_eq!(result.cnvs().lineage_b[0].copy_number, 1);
        assert_eq!(result.calls().len(), 1);
        assert_eq!(result.calls()[0].total_copies, 2);
        assert_approx_eq!(result.calls()[0].allele_frequency, 0.66667);

        // chromosome with no haplotype list
        assert!(process_chromosome("chr2", 100, &script).is_err());
    }

    #[test]
    fn test_run_clone() {
        let (reference, script) = load_test_inputs();
        let results = run_clone(&reference, &script).unwrap();
        assert_eq!(results.iter().map(|r| r.chrom()).collect::<Vec<&str>>(), vec!["chr1", "chr2"]);

        // chr1: SNV at 10 on A, duplication of 21-80 on A
        let chr1 = &results[0];
        assert_eq!(chr1.tracks().len(), 2);
        assert_eq!(chr1.calls().len(), 1);
        assert_eq!(chr1.calls()[0].position, 10);
        assert_approx_eq!(chr1.calls()[0].allele_frequency, 0.5);
        assert_eq!(chr1.cnvs().find_block(30).unwrap().copy_number, 3);

        // chr2: SNV at 30 shared by all three haplotypes, deletion 61-100 on B
        let chr2 = &results[1];
        assert_eq!(chr2.tracks().len(), 3);
        assert_eq!(chr2.calls().len(), 2);
        assert_eq!(chr2.calls()[0].position, 30);
        assert_eq!(chr2.calls()[0].haplotype_counts.len(), 3);
        assert_approx_eq!(chr2.calls()[0].allele_frequency, 1.0);
        assert_eq!(chr2.cnvs().find_block(70).unwrap().copy_number, 2);
    }

    #[test]
    fn test_write_outputs() {
        let (reference, script) = load_test_inputs();
        let results = run_clone(&reference, &script).unwrap();
        let folder = scratch_folder("write_outputs");
        let layout = OutputLayoutBuilder::default()
            .directory(folder.clone())
            .prefix("test_")
            .clone_name("clone1")
            .build().unwrap();
        write_outputs(&results, &reference, &layout, Path::new("./test_data/ref.fa"), true).unwrap();

        let cnv_text = std::fs::read_to_string(folder.join("test_clone1cnv.txt")).unwrap();
        assert!(cnv_text.starts_with("Chromosome\tStart\tEnd\tCopy Number\tA Allele\tB Allele\n"));
        assert!(cnv_text.contains("chr1\t21\t80\t3\t2\t1\n"));

        let vcf_text = std::fs::read_to_string(folder.join("test_clone1.vcf")).unwrap();
        assert!(vcf_text.contains("chr1\t10\t.\tA\tG\t.\t.\tNS=1\tAF:TC:HS:HC:CN\t0.5:1:A:1:2\n"));

        let blocks_text = std::fs::read_to_string(folder.join("test_clone1blocks.txt")).unwrap();
        assert!(blocks_text.starts_with("clone1_chr1_A\n"));

        // every haplotype gets a FASTA
        for name in ["chr1A", "chr1B", "chr2A1", "chr2A2", "chr2B"] {
            assert!(folder.join(format!("test_clone1{name}.fasta")).exists());
        }

        // the unedited haplotype matches the reference
        let fasta_text = std::fs::read_to_string(folder.join("test_clone1chr1B.fasta")).unwrap();
        let sequence: String = fasta_text.lines().skip(1).collect();
        assert_eq!(fasta_text.lines().next().unwrap(), ">clone1_chr1_B");
        assert_eq!(sequence.as_bytes(), reference.sequence("chr1"));

        // duplicated haplotype grows by the copied length
        let fasta_text = std::fs::read_to_string(folder.join("test_clone1chr1A.fasta")).unwrap();
        let sequence: String = fasta_text.lines().skip(1).collect();
        assert_eq!(sequence.len(), 160);

        std::fs::remove_dir_all(&folder).unwrap();
    }

    #[test]
    fn test_output_exit_code() {
        let result: Result<(), MaterializeError> = Err(MaterializeError::UnclosedInversion { open: 1 });
        let error = result.with_context(|| "Error while building sequence for chr1A:").unwrap_err();
        assert_eq!(output_exit_code(&error), exitcode::SOFTWARE);

        let result: std::io::Result<()> = Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        let error = result.with_context(|| "Error while creating output:").unwrap_err();
        assert_eq!(output_exit_code(&error), exitcode::IOERR);
    }
}
