
use anyhow::{anyhow, ensure, Context};
use log::warn;
use indexmap::IndexMap;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use std::path::{Path, PathBuf};

/// The selected chromosomes of a reference, ordered and sized by the FASTA index
pub struct ReferenceContext {
    /// The loaded sequences
    genome: ReferenceGenome,
    /// Selected chromosome -> length, in index order
    lengths: IndexMap<String, u64>
}

impl ReferenceContext {
    /// Loads the FASTA and its `.fai` index, keeping only the selected chromosomes
    /// # Arguments
    /// * `reference_fn` - the FASTA file; `<reference_fn>.fai` must exist next to it
    /// * `chromosomes` - the chromosomes to keep
    /// * `skip_missing` - if true, chromosomes absent from the index are dropped with a warning instead of failing
    /// # Errors
    /// * if either file fails to load
    /// * if a selected chromosome is missing or has an inconsistent length, see `from_parts(...)`
    pub fn load(reference_fn: &Path, chromosomes: &[String], skip_missing: bool) -> anyhow::Result<Self> {
        let fai_fn = fai_filename(reference_fn);
        let index = load_fai_lengths(&fai_fn)?;
        let genome = ReferenceGenome::from_fasta(reference_fn)
            .map_err(|e| anyhow!("Error while loading reference genome {reference_fn:?}: {e:?}"))?;
        Self::from_parts(genome, index, chromosomes, skip_missing)
    }

    /// Combines a loaded genome with the index lengths, keeping only the selected chromosomes in index order
    /// # Errors
    /// * if a selected chromosome is not in the index, unless `skip_missing` is set
    /// * if no selected chromosome remains
    /// * if a selected chromosome is not in the FASTA
    /// * if the FASTA sequence length disagrees with the index
    pub fn from_parts(genome: ReferenceGenome, index: IndexMap<String, u64>, chromosomes: &[String], skip_missing: bool) -> anyhow::Result<Self> {
        let missing: Vec<&str> = chromosomes.iter()
            .filter(|chrom| !index.contains_key(*chrom))
            .map(|chrom| chrom.as_str())
            .collect();
        if !missing.is_empty() {
            ensure!(skip_missing, "Chromosome {:?} is missing from the reference index", missing[0]);
            warn!("Skipping chromosomes missing from the reference index: {}", missing.join(","));
        }

        let lengths: IndexMap<String, u64> = index.into_iter()
            .filter(|(chrom, _length)| chromosomes.contains(chrom))
            .collect();
        ensure!(!lengths.is_empty(), "None of the selected chromosomes are in the reference index");
        for (chrom, &length) in lengths.iter() {
            ensure!(
                genome.contig_keys().iter().any(|k| k == chrom),
                "Chromosome {chrom:?} is missing from the reference FASTA"
            );
            let sequence_len = genome.get_full_chromosome(chrom).len() as u64;
            ensure!(
                sequence_len == length,
                "Chromosome {chrom:?} has length {sequence_len} in the reference FASTA, but {length} in the index"
            );
        }

        Ok(Self {
            genome, lengths
        })
    }

    /// Full sequence of a selected chromosome
    pub fn sequence(&self, chrom: &str) -> &[u8] {
        self.genome.get_full_chromosome(chrom)
    }

    /// Selected chromosomes in index order
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.lengths.keys().map(|k| k.as_str())
    }

    pub fn lengths(&self) -> &IndexMap<String, u64> {
        &self.lengths
    }
}

/// Returns the expected index path, e.g. `ref.fa` -> `ref.fa.fai`
pub fn fai_filename(reference_fn: &Path) -> PathBuf {
    let mut fai_fn = reference_fn.as_os_str().to_owned();
    fai_fn.push(".fai");
    PathBuf::from(fai_fn)
}

/// Reads chromosome names and lengths from a FASTA index, preserving file order.
/// Only the first two columns are used.
/// # Errors
/// * if the file cannot be opened or a row is malformed
pub fn load_fai_lengths(fai_fn: &Path) -> anyhow::Result<IndexMap<String, u64>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(fai_fn)
        .with_context(|| format!("Error while opening {fai_fn:?}:"))?;

    let mut lengths = IndexMap::new();
    for result in csv_reader.records() {
        let row = result.with_context(|| format!("Error while reading {fai_fn:?}"))?;
        let chrom = row.get(0).ok_or(anyhow!("Missing chromosome on row: {row:?}"))?;
        let length: u64 = row.get(1).ok_or(anyhow!("Missing length on row: {row:?}"))?
            .trim()
            .parse()
            .with_context(|| format!("Error while parsing length on row: {row:?}"))?;
        lengths.insert(chrom.to_string(), length);
    }
    Ok(lengths)
}
