
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Bases per sequence line
pub const LINE_WIDTH: usize = 80;

/// Writes a single-record FASTA file
/// # Arguments
/// * `filename` - output path
/// * `name` - record name, written after `>`
/// * `sequence` - the bases
/// # Errors
/// * if the file cannot be created or written
pub fn write_fasta_file(filename: &Path, name: &str, sequence: &[u8]) -> anyhow::Result<()> {
    let file = std::fs::File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    write_fasta_record(&mut writer, name, sequence)
        .with_context(|| format!("Error while writing {filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

/// Writes one record, wrapped at `LINE_WIDTH`; an empty sequence still gets one (empty) sequence line
pub fn write_fasta_record<W: Write>(writer: &mut W, name: &str, sequence: &[u8]) -> std::io::Result<()> {
    writeln!(writer, ">{name}")?;
    if sequence.is_empty() {
        writeln!(writer)?;
    }
    for line in sequence.chunks(LINE_WIDTH) {
        writer.write_all(line)?;
        writeln!(writer)?;
    }
    Ok(())
}
