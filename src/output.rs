//! Output writers: SAM and the minimal `.mr` tab-delimited format, selected
//! by output-path suffix (spec.md §6). Output formatting is named as an
//! external collaborator in spec.md §1, but a concrete writer is needed to
//! run the pipeline end to end; hand-rolled per the field lists in §6 since
//! no crate in the example pack offers an off-the-shelf writer this small
//! (see DESIGN.md).

use crate::error::SeedmapResult;
use crate::genome::{Genome, GenomePosition, Strand};
use std::io::Write;

/// Output record format, chosen by output-path suffix (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Sam,
    Mr,
}

impl OutputFormat {
    pub fn from_path(path: &str) -> OutputFormat {
        if path.ends_with(".mr") {
            OutputFormat::Mr
        } else {
            OutputFormat::Sam
        }
    }
}

const SAM_PAIRED: u16 = 0x1;
const SAM_PROPER_PAIR: u16 = 0x2;
const SAM_UNMAPPED: u16 = 0x4;
const SAM_REVERSE: u16 = 0x10;
pub const FIRST_IN_PAIR: u16 = 0x40;
pub const SECOND_IN_PAIR: u16 = 0x80;

/// A mapped record ready to be written, independent of output format.
pub struct MappedRecord<'a> {
    pub name: &'a str,
    pub seq: &'a [u8],
    pub position: GenomePosition,
    pub mismatch: u32,
    pub strand: Strand,
}

/// Write the SAM header (`@HD`/`@SQ` lines) once, before any records.
pub fn write_sam_header<W: Write>(writer: &mut W, genome: &Genome) -> SeedmapResult<()> {
    writeln!(writer, "@HD\tVN:1.6\tSO:unsorted")?;
    for chrom in &genome.chromosomes {
        writeln!(writer, "@SQ\tSN:{}\tLN:{}", chrom.name, chrom.length)?;
    }
    Ok(())
}

/// Write one single-end mapped record.
pub fn write_single_mapped<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    genome: &Genome,
    record: &MappedRecord,
) -> SeedmapResult<()> {
    match format {
        OutputFormat::Sam => {
            let flag = if record.strand == Strand::Reverse { SAM_REVERSE } else { 0 };
            write_sam_line(writer, record.name, flag, genome, record)
        }
        OutputFormat::Mr => write_mr_line(writer, genome, record),
    }
}

/// Write one single-end unmapped record (`read_name` only identifies it).
pub fn write_single_unmapped<W: Write>(writer: &mut W, format: OutputFormat, name: &str, seq: &[u8]) -> SeedmapResult<()> {
    match format {
        OutputFormat::Sam => {
            writeln!(writer, "{}\t{}\t*\t0\t0\t*\t*\t0\t0\t{}\t*", name, SAM_UNMAPPED, String::from_utf8_lossy(seq))?;
        }
        OutputFormat::Mr => {
            writeln!(writer, "*\t0\t0\t{}\t.\t.\t{}", name, String::from_utf8_lossy(seq))?;
        }
    }
    Ok(())
}

/// Write one mate of a paired-end mapped pair. `mate_flag` is
/// `FIRST_IN_PAIR` or `SECOND_IN_PAIR`; `mate_pos` is the other mate's
/// genomic position, used for SAM's `RNEXT`/`PNEXT` fields.
pub fn write_paired_mapped<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    genome: &Genome,
    record: &MappedRecord,
    mate_flag: u16,
    mate_pos: GenomePosition,
) -> SeedmapResult<()> {
    match format {
        OutputFormat::Sam => {
            let mut flag = SAM_PAIRED | SAM_PROPER_PAIR | mate_flag;
            if record.strand == Strand::Reverse {
                flag |= SAM_REVERSE;
            }
            let name = genome.chromosome_name(record.position.chrom);
            let mate_name = if mate_pos.chrom == record.position.chrom { "=" } else { genome.chromosome_name(mate_pos.chrom) };
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t255\t{}M\t{}\t{}\t0\t{}\t*\tNM:i:{}",
                record.name,
                flag,
                name,
                record.position.offset + 1,
                record.seq.len(),
                mate_name,
                mate_pos.offset + 1,
                String::from_utf8_lossy(record.seq),
                record.mismatch,
            )?;
        }
        OutputFormat::Mr => write_mr_line(writer, genome, record)?,
    }
    Ok(())
}

fn write_sam_line<W: Write>(writer: &mut W, name: &str, flag: u16, genome: &Genome, record: &MappedRecord) -> SeedmapResult<()> {
    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t255\t{}M\t*\t0\t0\t{}\t*\tNM:i:{}",
        name,
        flag,
        genome.chromosome_name(record.position.chrom),
        record.position.offset + 1,
        record.seq.len(),
        String::from_utf8_lossy(record.seq),
        record.mismatch,
    )?;
    Ok(())
}

fn write_mr_line<W: Write>(writer: &mut W, genome: &Genome, record: &MappedRecord) -> SeedmapResult<()> {
    let start = record.position.offset;
    let end = start + record.seq.len() as u32;
    let strand = if record.strand == Strand::Reverse { '-' } else { '+' };
    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        genome.chromosome_name(record.position.chrom),
        start,
        end,
        record.name,
        record.mismatch,
        strand,
        String::from_utf8_lossy(record.seq),
    )?;
    Ok(())
}

/// Derive an auxiliary output path (`_amb`/`_unmapped`) or a multi-input
/// suffix (`_s<i>`/`_p<i>`) by inserting `suffix` before the file extension,
/// per spec.md §6.
pub fn derive_path(base: &str, suffix: &str) -> String {
    match base.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &base[..dot], suffix, &base[dot..]),
        _ => format!("{}{}", base, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::ChromosomeInfo;

    fn genome() -> Genome {
        Genome { chromosomes: vec![ChromosomeInfo { name: "chr1".into(), length: 100 }] }
    }

    #[test]
    fn format_from_path_recognizes_mr_suffix() {
        assert_eq!(OutputFormat::from_path("out.mr"), OutputFormat::Mr);
        assert_eq!(OutputFormat::from_path("out.sam"), OutputFormat::Sam);
        assert_eq!(OutputFormat::from_path("out"), OutputFormat::Sam);
    }

    #[test]
    fn mr_line_has_seven_tab_fields() {
        let mut buf = Vec::new();
        let record = MappedRecord {
            name: "read1",
            seq: b"AACCGG",
            position: GenomePosition { chrom: 0, offset: 10 },
            mismatch: 1,
            strand: Strand::Forward,
        };
        write_single_mapped(&mut buf, OutputFormat::Mr, &genome(), &record).unwrap();
        let line = String::from_utf8(buf).unwrap();
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(fields, vec!["chr1", "10", "16", "read1", "1", "+", "AACCGG"]);
    }

    #[test]
    fn sam_unmapped_sets_unmapped_flag() {
        let mut buf = Vec::new();
        write_single_unmapped(&mut buf, OutputFormat::Sam, "read1", b"AACCGG").unwrap();
        let line = String::from_utf8(buf).unwrap();
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(fields[1], "4");
    }

    #[test]
    fn derive_path_inserts_suffix_before_extension() {
        assert_eq!(derive_path("out.sam", "_amb"), "out_amb.sam");
        assert_eq!(derive_path("out.mr", "_s1"), "out_s1.mr");
        assert_eq!(derive_path("noext", "_unmapped"), "noext_unmapped");
    }
}
