
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::data_types::combined::CombinedCnvs;

/// One row of the copy-number report
#[derive(Serialize)]
struct CnvRow<'a> {
    #[serde(rename = "Chromosome")]
    chrom: &'a str,
    #[serde(rename = "Start")]
    start: u64,
    #[serde(rename = "End")]
    end: u64,
    #[serde(rename = "Copy Number")]
    copy_number: u64,
    #[serde(rename = "A Allele")]
    a_allele: u64,
    #[serde(rename = "B Allele")]
    b_allele: u64
}

/// Writes the combined copy-number report for all chromosomes to a file
/// # Arguments
/// * `filename` - output TSV path
/// * `reports` - (chromosome, combined copy numbers) in output order
/// # Errors
/// * if the file cannot be created or written
pub fn write_cnv_report<'a>(filename: &Path, reports: impl IntoIterator<Item = (&'a str, &'a CombinedCnvs)>) -> anyhow::Result<()> {
    let file = std::fs::File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    write_cnv_contents(file, reports)
        .with_context(|| format!("Error while writing {filename:?}:"))
}

/// Writes the report rows to any writer.
/// The three combined reports share their block boundaries, so rows are built by zipping them.
pub fn write_cnv_contents<'a, W: Write>(writer: W, reports: impl IntoIterator<Item = (&'a str, &'a CombinedCnvs)>) -> csv::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    let mut any_rows = false;
    for (chrom, cnvs) in reports.into_iter() {
        for ((all, a), b) in cnvs.all.iter().zip(cnvs.lineage_a.iter()).zip(cnvs.lineage_b.iter()) {
            csv_writer.serialize(CnvRow {
                chrom,
                start: all.start,
                end: all.end,
                copy_number: all.copy_number,
                a_allele: a.copy_number,
                b_allele: b.copy_number
            })?;
            any_rows = true;
        }
    }

    if !any_rows {
        // serialize() only emits the header with the first row
        csv_writer.write_record(["Chromosome", "Start", "End", "Copy Number", "A Allele", "B Allele"])?;
    }
    csv_writer.flush()?;
    Ok(())
}
