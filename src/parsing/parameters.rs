
use anyhow::{bail, Context};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::parsing::reference::fai_filename;
use crate::util::json_io::load_json;

/// Special chromosome selection meaning the autosomes
pub const ALL_CHROMOSOMES: &str = "all";

/// Chromosome selection as it appears in the parameters file
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum ChromosomeSelection {
    Single(String),
    List(Vec<String>)
}

/// Parameters file contents before defaults are applied.
/// The file is shared with upstream tools, so unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawParameters {
    /// Reference FASTA
    pub reference: Option<PathBuf>,
    /// Folder holding the edit script and receiving all outputs
    pub directory: Option<PathBuf>,
    /// Prefix for every input and output filename in `directory`
    pub prefix: Option<String>,
    /// Which chromosomes to process
    pub chromosomes: Option<ChromosomeSelection>
}

/// Fully resolved run parameters
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunParameters {
    /// Reference FASTA
    pub reference_fn: PathBuf,
    /// Reference FASTA index
    pub fai_fn: PathBuf,
    /// Folder holding the edit script and receiving all outputs
    pub directory: PathBuf,
    /// Filename prefix
    pub prefix: String,
    /// Selected chromosomes
    pub chromosomes: Vec<String>,
    /// True when the chromosomes came from the "all" default; missing ones are then skipped instead of rejected
    pub skip_missing: bool
}

impl RunParameters {
    /// Loads and resolves a parameters file
    /// # Arguments
    /// * `filename` - the JSON parameters file, optionally gzipped
    /// * `chromosome_override` - if provided, the only chromosome to process
    /// # Errors
    /// * if the file cannot be loaded
    /// * if required parameters are missing
    pub fn load(filename: &Path, chromosome_override: Option<&str>) -> anyhow::Result<Self> {
        let raw: RawParameters = load_json(filename)
            .with_context(|| format!("Error while loading parameters from {filename:?}:"))?;
        Self::resolve(raw, chromosome_override)
    }

    /// Applies defaults to the raw parameters
    /// # Errors
    /// * if no reference is provided
    /// * if the chromosome list is empty
    pub fn resolve(raw: RawParameters, chromosome_override: Option<&str>) -> anyhow::Result<Self> {
        let reference_fn = match raw.reference {
            Some(r) => r,
            None => bail!("No input genome FASTA file provided.")
        };
        let fai_fn = fai_filename(&reference_fn);

        let directory = raw.directory.unwrap_or_else(|| {
            warn!("No output directory given, using current directory.");
            PathBuf::from(".")
        });

        let selection = match chromosome_override {
            Some(chrom) => ChromosomeSelection::Single(chrom.to_string()),
            None => raw.chromosomes.unwrap_or(ChromosomeSelection::Single(ALL_CHROMOSOMES.to_string()))
        };
        let (chromosomes, skip_missing) = expand_selection(selection);
        if chromosomes.is_empty() {
            bail!("Chromosome list must not be empty.");
        }

        Ok(Self {
            reference_fn,
            fai_fn,
            directory,
            prefix: raw.prefix.unwrap_or_default(),
            chromosomes,
            skip_missing
        })
    }

    /// Location of the edit script, `<directory>/<prefix>variants.json`
    pub fn edit_script_filename(&self) -> PathBuf {
        self.directory.join(format!("{}variants.json", self.prefix))
    }
}

/// Converts a selection into a chromosome list, where "all" means chr1 through chr22.
/// The flag is true if the list came from "all".
fn expand_selection(selection: ChromosomeSelection) -> (Vec<String>, bool) {
    let chromosomes = match selection {
        ChromosomeSelection::Single(chrom) => vec![chrom],
        ChromosomeSelection::List(chroms) => chroms
    };
    if chromosomes.len() == 1 && chromosomes[0] == ALL_CHROMOSOMES {
        ((1..=22).map(|i| format!("chr{i}")).collect(), true)
    } else {
        (chromosomes, false)
    }
}
