//! FASTQ record model, ambiguity-code normalization, and adapter clipping
//! (spec.md §4.1/§4.6; FASTQ parsing and adapter clipping themselves are
//! named as external collaborators in spec.md §1, but the pipeline must
//! still invoke them, so this crate wraps `bio::io::fastq` rather than
//! reimplementing record parsing).

use crate::error::SeedmapResult;
use bio::io::fastq;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Open `path`, transparently decompressing it if it starts with the gzip
/// magic bytes.
pub fn open_maybe_gz(path: &str) -> SeedmapResult<Box<dyn Read + Send>> {
    let mut file = File::open(Path::new(path))?;
    let mut magic = [0u8; 2];
    let read_len = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if read_len == 2 && magic == [0x1f, 0x8b] {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// A single read, normalized to the canonical `{A,C,G,T,N}` alphabet.
#[derive(Clone, Debug)]
pub struct ReadRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// Coerce a raw FASTQ sequence byte to the canonical alphabet: uppercase
/// A/C/G/T pass through, anything else (lowercase, ambiguity codes such as
/// R/Y/W/S/K/M, N itself) becomes `N`. Returns the normalized byte
/// plus whether coercion actually changed it, so callers can log once per
/// batch instead of once per base.
fn normalize_base(b: u8) -> (u8, bool) {
    match b {
        b'A' | b'C' | b'G' | b'T' | b'N' => (b, false),
        b'a' => (b'A', true),
        b'c' => (b'C', true),
        b'g' => (b'G', true),
        b't' => (b'T', true),
        b'n' => (b'N', true),
        _ => (b'N', true),
    }
}

fn normalize_seq(seq: &[u8]) -> (Vec<u8>, bool) {
    let mut any_coerced = false;
    let normalized = seq
        .iter()
        .map(|&b| {
            let (out, coerced) = normalize_base(b);
            any_coerced |= coerced;
            out
        })
        .collect();
    (normalized, any_coerced)
}

/// Read up to `n` records from `reader`, normalizing sequences as they come
/// in. Stops early at end of input. Logs a single `debug!` if any record in
/// the batch needed ambiguity-code coercion, per SPEC_FULL.md §4.1.
pub fn read_batch<R: Read>(reader: &mut fastq::Reader<R>, n: usize) -> SeedmapResult<Vec<ReadRecord>> {
    let mut batch = Vec::with_capacity(n.min(4096));
    let mut any_coerced = false;

    for result in reader.records().take(n) {
        let record = result?;
        let (seq, coerced) = normalize_seq(record.seq());
        any_coerced |= coerced;
        batch.push(ReadRecord { name: record.id().to_owned(), seq });
    }

    if any_coerced {
        debug!("batch contained non-ACGTN bases, coerced to N");
    }
    Ok(batch)
}

/// Trim `read` at the leftmost occurrence of `adapter` (suffix match per
/// spec.md §4.6 step 2): everything from the match onward is discarded. A
/// no-op if `adapter` does not occur or is empty.
pub fn clip_adapter(seq: &mut Vec<u8>, adapter: &[u8]) {
    if adapter.is_empty() {
        return;
    }
    if let Some(pos) = find_subsequence(seq, adapter) {
        seq.truncate(pos);
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::NamedTempFile;

    #[test]
    fn open_maybe_gz_reads_plain_and_gz() {
        let content = b"@r1\nACGT\n+\n!!!!\n";

        let mut plain = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut plain, content).unwrap();
        let mut plain_reader = open_maybe_gz(plain.path().to_str().unwrap()).unwrap();
        let mut plain_buf = Vec::new();
        plain_reader.read_to_end(&mut plain_buf).unwrap();
        assert_eq!(content.as_ref(), plain_buf.as_slice());

        let mut gz = NamedTempFile::new().unwrap();
        {
            let mut encoder = GzEncoder::new(gz.as_file_mut(), Compression::default());
            std::io::Write::write_all(&mut encoder, content).unwrap();
            encoder.finish().unwrap();
        }
        let mut gz_reader = open_maybe_gz(gz.path().to_str().unwrap()).unwrap();
        let mut gz_buf = Vec::new();
        gz_reader.read_to_end(&mut gz_buf).unwrap();
        assert_eq!(content.as_ref(), gz_buf.as_slice());
    }

    #[test]
    fn lowercase_and_ambiguity_codes_coerce_to_canonical() {
        let (seq, coerced) = normalize_seq(b"acgtNRYn");
        assert_eq!(seq, b"ACGTNNNN");
        assert!(coerced);
    }

    #[test]
    fn already_canonical_sequence_is_unchanged() {
        let (seq, coerced) = normalize_seq(b"ACGTN");
        assert_eq!(seq, b"ACGTN");
        assert!(!coerced);
    }

    #[test]
    fn clip_adapter_truncates_at_leftmost_match() {
        let mut seq = b"AACCGGTTAGATCGGAAGAGC".to_vec();
        clip_adapter(&mut seq, b"AGATCGG");
        assert_eq!(seq, b"AACCGGTT");
    }

    #[test]
    fn clip_adapter_no_match_is_noop() {
        let mut seq = b"AACCGGTT".to_vec();
        clip_adapter(&mut seq, b"ZZZZ");
        assert_eq!(seq, b"AACCGGTT");
    }

    #[test]
    fn clip_adapter_empty_adapter_is_noop() {
        let mut seq = b"AACCGGTT".to_vec();
        clip_adapter(&mut seq, b"");
        assert_eq!(seq, b"AACCGGTT");
    }

    #[test]
    fn read_batch_respects_batch_size() {
        let fastq_text = b"@r1\nACGT\n+\nIIII\n@r2\nACGT\n+\nIIII\n@r3\nACGT\n+\nIIII\n".to_vec();
        let mut reader = fastq::Reader::new(&fastq_text[..]);
        let batch = read_batch(&mut reader, 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].name, "r1");
        assert_eq!(batch[1].name, "r2");
    }
}
