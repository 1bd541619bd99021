//! Ties the primary hash and bucket refinement together into the per-offset
//! candidate lookup used by both resolvers (spec.md §4.2/§4.4).

use crate::genome::GenomeImage;
use crate::index::PositionalIndex;
use crate::seed::{primary_hash, SeedConfig};

/// Look up the candidate position range for `converted_read` at `offset`.
///
/// Returns `None` when:
/// - the suffix starting at `offset` is shorter than the seed window,
/// - the primary hash's bucket is empty,
/// - the refined region is empty, or
/// - the refined region exceeds `bucket_cap` (spec.md §4.4 "Bucket overflow").
pub fn seed_candidates(
    pos_index: &PositionalIndex,
    image: &GenomeImage,
    seed_cfg: &SeedConfig,
    converted_read: &[u8],
    offset: usize,
    bucket_cap: usize,
) -> Option<(usize, usize)> {
    if offset > converted_read.len() {
        return None;
    }
    let suffix = &converted_read[offset..];
    if suffix.len() < seed_cfg.seed_length {
        return None;
    }

    let hash = primary_hash(suffix, seed_cfg.f2_seed_width)?;
    let (lo, hi) = pos_index.refine(image, seed_cfg, hash, suffix);
    if hi <= lo {
        return None;
    }
    if hi - lo > bucket_cap {
        return None;
    }
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::convert_ct;
    use crate::genome::ChromosomeSequence;
    use crate::index::build_positional_index_for_tests;

    fn small_seed_cfg() -> SeedConfig {
        SeedConfig {
            hashlen: 2,
            f2_seed_width: 2,
            f2_seed_position: vec![0, 1, 2, 3, 4, 5],
            seed_length: 6,
        }
    }

    #[test]
    fn bucket_overflow_skips_offset() {
        let image = GenomeImage {
            chromosomes: vec![ChromosomeSequence { sequence: convert_ct(b"AAACCGGTTAAACCGGTT") }],
        };
        let cfg = small_seed_cfg();
        let idx = build_positional_index_for_tests(&image, &cfg);
        let read = convert_ct(b"AACCGG");

        assert!(seed_candidates(&idx, &image, &cfg, &read, 0, 1).is_none());
        assert!(seed_candidates(&idx, &image, &cfg, &read, 0, 10).is_some());
    }

    #[test]
    fn short_suffix_is_skipped() {
        let image = GenomeImage {
            chromosomes: vec![ChromosomeSequence { sequence: convert_ct(b"AAACCGGTT") }],
        };
        let cfg = small_seed_cfg();
        let idx = build_positional_index_for_tests(&image, &cfg);
        let read = convert_ct(b"AACCGG");

        // offset 3 leaves only 3 bases, shorter than the 6-base seed window.
        assert!(seed_candidates(&idx, &image, &cfg, &read, 3, 100).is_none());
    }
}
