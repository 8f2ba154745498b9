
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::data_types::edit_event::EditEvent;
use crate::util::json_io::load_json;

/// One clone entry in the script: the event list and the chromosome -> haplotype labels map
#[derive(Deserialize)]
struct RawCloneEntry(Vec<Value>, IndexMap<String, Vec<String>>);

/// All edits and haplotypes for one clone
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CloneScript {
    /// Clone name
    clone: String,
    /// Events in application order
    events: Vec<EditEvent>,
    /// Chromosome -> haplotype labels present in the clone
    haplotypes: IndexMap<String, Vec<String>>
}

impl CloneScript {
    /// Loads the edit script and pulls out one clone
    /// # Arguments
    /// * `filename` - the edit script JSON, keyed by clone name
    /// * `clone` - the clone to extract
    /// # Errors
    /// * if the file fails to load
    /// * if the clone is not present
    /// * if any event is malformed
    pub fn load(filename: &Path, clone: &str) -> anyhow::Result<Self> {
        let script: FxHashMap<String, Value> = load_json(filename)
            .with_context(|| format!("Error while loading edit script from {filename:?}:"))?;
        let entry = script.get(clone)
            .ok_or(anyhow!("{clone} not listed in edit script {filename:?}"))?;
        Self::from_value(clone, entry)
    }

    /// Parses a single clone entry
    /// # Errors
    /// * if the entry is not `[events, haplotypes]`
    /// * if any event is malformed
    pub fn from_value(clone: &str, entry: &Value) -> anyhow::Result<Self> {
        let RawCloneEntry(raw_events, haplotypes) = RawCloneEntry::deserialize(entry)
            .with_context(|| format!("Error while parsing edit script entry for {clone}:"))?;
        let events = raw_events.iter()
            .enumerate()
            .map(|(i, value)| {
                EditEvent::try_from(value)
                    .with_context(|| format!("Error while parsing event #{i} of {clone}:"))
            })
            .collect::<anyhow::Result<Vec<EditEvent>>>()?;

        Ok(Self {
            clone: clone.to_string(),
            events,
            haplotypes
        })
    }

    /// Haplotype labels of a chromosome
    /// # Errors
    /// * if the chromosome is not in the haplotype map
    pub fn haplotypes_for(&self, chrom: &str) -> anyhow::Result<&[String]> {
        self.haplotypes.get(chrom)
            .map(|h| h.as_slice())
            .ok_or(anyhow!("Chromosome {chrom} has no haplotypes listed for {}", self.clone))
    }

    // getters
    pub fn clone_name(&self) -> &str {
        &self.clone
    }

    pub fn events(&self) -> &[EditEvent] {
        &self.events
    }
}
