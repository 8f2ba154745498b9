
use anyhow::Context;
use itertools::Itertools;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_types::combined::CombinedVariantCall;

/// Fixed meta lines following the reference line
const META_LINES: [&str; 6] = [
    "##INFO=<ID=NS,Number=1,Type=Integer,Description=\"Number of Samples With Data\">",
    "##FORMAT=<ID=AF,Number=A,Type=Float,Description=\"Alt allele frequency\">",
    "##FORMAT=<ID=TC,Number=1,Type=Integer,Description=\"Total copies of alt allele\">",
    "##FORMAT=<ID=HS,Number=1,Type=Character,Description=\"Haplotypes\">",
    "##FORMAT=<ID=HC,Number=.,Type=Integer,Description=\"Total copies of alt allele per haplotype\">",
    "##FORMAT=<ID=CN,Number=2,Type=Integer,Description=\"Copy number at position\">"
];

/// Writes the combined variant calls of all chromosomes to a VCF file, dated today
/// # Arguments
/// * `filename` - output VCF path
/// * `clone` - clone name, used as the sample column
/// * `reference_fn` - reference path recorded in the header
/// * `reports` - (chromosome, variant calls) in output order
/// # Errors
/// * if the file cannot be created or written
pub fn write_vcf_report<'a>(
    filename: &Path, clone: &str, reference_fn: &Path,
    reports: impl IntoIterator<Item = (&'a str, &'a [CombinedVariantCall])>
) -> anyhow::Result<()> {
    let file = std::fs::File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    let file_date = chrono::Local::now().format("%Y%m%d").to_string();
    write_vcf_contents(&mut writer, clone, reference_fn, &file_date, reports)
        .with_context(|| format!("Error while writing {filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

/// Writes the full VCF text to any writer
pub fn write_vcf_contents<'a, W: Write>(
    writer: &mut W, clone: &str, reference_fn: &Path, file_date: &str,
    reports: impl IntoIterator<Item = (&'a str, &'a [CombinedVariantCall])>
) -> std::io::Result<()> {
    writeln!(writer, "##fileformat=VCFv4.2")?;
    writeln!(writer, "##fileDate={file_date}")?;
    writeln!(writer, "##source=heterogenesis_varincorp-{clone}")?;
    writeln!(writer, "##reference=file:{}", reference_fn.display())?;
    for line in META_LINES.iter() {
        writeln!(writer, "{line}")?;
    }
    writeln!(writer, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{clone}")?;

    for (chrom, calls) in reports.into_iter() {
        for call in calls.iter() {
            writeln!(writer, "{}", format_record(chrom, call))?;
        }
    }
    Ok(())
}

/// Formats one data line
fn format_record(chrom: &str, call: &CombinedVariantCall) -> String {
    let haplotypes = call.haplotype_counts.iter().map(|(label, _count)| label).join(",");
    let counts = call.haplotype_counts.iter().map(|(_label, count)| count).join(",");
    format!(
        "{chrom}\t{}\t.\t{}\t{}\t.\t.\tNS=1\tAF:TC:HS:HC:CN\t{}:{}:{haplotypes}:{counts}:{}",
        call.position,
        String::from_utf8_lossy(&call.reference),
        String::from_utf8_lossy(&call.alternate),
        format_frequency(call.allele_frequency),
        call.total_copies,
        call.copy_number
    )
}

/// Formats a frequency as the shortest decimal that round-trips, always with a fractional part (e.g. "1.0").
/// Very small or very large values switch to scientific notation with a two digit exponent (e.g. "1e-05").
pub fn format_frequency(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{value:e}");
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or_default();
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exponent.abs())
            },
            None => scientific
        };
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(1.0), "1.0");
        assert_eq!(format_frequency(0.0), "0.0");
        assert_eq!(format_frequency(2.0), "2.0");
        assert_eq!(format_frequency(0.5), "0.5");
        assert_eq!(format_frequency(0.33333), "0.33333");
        assert_eq!(format_frequency(1.66667), "1.66667");
        assert_eq!(format_frequency(0.0001), "0.0001");
        assert_eq!(format_frequency(0.00001), "1e-05");
        assert_eq!(format_frequency(0.00005), "5e-05");
        assert_eq!(format_frequency(1e16), "1e+16");
    }

    #[test]
    fn test_write_vcf_contents() {
        let calls = vec![
            CombinedVariantCall {
                position: 50,
                reference: b"A".to_vec(),
                alternate: b"T".to_vec(),
                allele_frequency: 0.66667,
                total_copies: 2,
                haplotype_counts: vec![("A1".to_string(), 1), ("A2".to_string(), 1)],
                copy_number: 3
            },
            CombinedVariantCall {
                position: 70,
                reference: b"C".to_vec(),
                alternate: b"CGG".to_vec(),
                allele_frequency: 1.0,
                total_copies: 2,
                haplotype_counts: vec![("B".to_string(), 2)],
                copy_number: 2
            }
        ];

        let mut buffer: Vec<u8> = vec![];
        write_vcf_contents(&mut buffer, "clone1", Path::new("/data/ref.fa"), "20240102", [("chr1", calls.as_slice())]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "##fileformat=VCFv4.2");
        assert_eq!(lines[1], "##fileDate=20240102");
        assert_eq!(lines[2], "##source=heterogenesis_varincorp-clone1");
        assert_eq!(lines[3], "##reference=file:/data/ref.fa");
        assert_eq!(lines[4], "##INFO=<ID=NS,Number=1,Type=Integer,Description=\"Number of Samples With Data\">");
        assert_eq!(lines[10], "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tclone1");
        assert_eq!(lines[11], "chr1\t50\t.\tA\tT\t.\t.\tNS=1\tAF:TC:HS:HC:CN\t0.66667:2:A1,A2:1,1:3");
        assert_eq!(lines[12], "chr1\t70\t.\tC\tCGG\t.\t.\tNS=1\tAF:TC:HS:HC:CN\t1.0:2:B:2:2");
        assert!(text.ends_with('\n'));
    }
}
