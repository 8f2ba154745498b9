
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::haplotype_track::HaplotypeTrack;
use crate::writers::OutputLayout;

/// Writes the final content partition of every haplotype, mostly for debugging
/// # Errors
/// * if the file cannot be created or written
pub fn write_block_dump<'a>(filename: &Path, layout: &OutputLayout, tracks: impl IntoIterator<Item = &'a HaplotypeTrack>) -> anyhow::Result<()> {
    let file = std::fs::File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    write_block_contents(&mut writer, layout, tracks)
        .with_context(|| format!("Error while writing {filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

/// One `<clone>_<chrom>_<hap>` line per haplotype, followed by its segments
pub fn write_block_contents<'a, W: Write>(writer: &mut W, layout: &OutputLayout, tracks: impl IntoIterator<Item = &'a HaplotypeTrack>) -> std::io::Result<()> {
    for track in tracks.into_iter() {
        writeln!(writer, "{}", layout.haplotype_name(track.chrom(), track.label()))?;
        for segment in track.content().segments().iter() {
            writeln!(writer, "{segment}")?;
        }
    }
    Ok(())
}
