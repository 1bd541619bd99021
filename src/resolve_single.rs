//! Single-end resolution: seed+verify across seed offsets and both strands,
//! optionally both bisulfite conventions (spec.md §4.4).

use crate::base::{convert_ct, convert_ga, reverse_complement};
use crate::genome::{Genome, GenomeImage, Strand};
use crate::index::{Index, PositionalIndex};
use crate::seed::{SeedConfig, NUM_SEED_OFFSETS};
use crate::seeder::seed_candidates;
use crate::verify::{verify, BestMatch, Classification};

/// Outcome of single-end resolution for one read.
#[derive(Clone, Copy, Debug)]
pub struct SingleEndOutcome {
    pub best: BestMatch,
    pub classification: Classification,
}

/// Resolve a single read against `index`. `read` is the raw (unconverted)
/// ASCII sequence. `wildcard` enables the A/G mode that additionally tries
/// the G→A image (spec.md §4.1, §4.4 step 5).
pub fn resolve_single(
    index: &Index,
    read: &[u8],
    max_mismatches: u32,
    bucket_cap: usize,
    wildcard: bool,
) -> SingleEndOutcome {
    let mut best = BestMatch::initial(max_mismatches);

    if read.len() < index.seed_cfg.hashlen as usize {
        return SingleEndOutcome { best, classification: Classification::Unmapped };
    }

    let rc = reverse_complement(read);

    scan_image(
        &index.ct_index,
        &index.ct_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ct(read),
        Strand::Forward,
        bucket_cap,
        &mut best,
    );
    scan_image(
        &index.ct_index,
        &index.ct_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ct(&rc),
        Strand::Reverse,
        bucket_cap,
        &mut best,
    );

    if wildcard {
        scan_image(
            &index.ga_index,
            &index.ga_image,
            &index.genome,
            &index.seed_cfg,
            &convert_ga(read),
            Strand::Forward,
            bucket_cap,
            &mut best,
        );
        scan_image(
            &index.ga_index,
            &index.ga_image,
            &index.genome,
            &index.seed_cfg,
            &convert_ga(&rc),
            Strand::Reverse,
            bucket_cap,
            &mut best,
        );
    }

    let classification = best.classify(max_mismatches);
    SingleEndOutcome { best, classification }
}

/// Seed and verify `converted_read` against one genome image at every seed
/// offset in `[0, NUM_SEED_OFFSETS)`, updating `best` in place.
pub fn scan_image(
    pos_index: &PositionalIndex,
    image: &GenomeImage,
    genome: &Genome,
    seed_cfg: &SeedConfig,
    converted_read: &[u8],
    strand: Strand,
    bucket_cap: usize,
    best: &mut BestMatch,
) {
    for offset in 0..NUM_SEED_OFFSETS {
        let (lo, hi) = match seed_candidates(pos_index, image, seed_cfg, converted_read, offset, bucket_cap) {
            Some(range) => range,
            None => continue,
        };
        for idx in lo..hi {
            let candidate = pos_index.positions.get(idx);
            if let Some(count) = verify(image, genome, converted_read, offset, candidate, best.mismatch) {
                best.update(candidate, count, strand);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{ChromosomeInfo, ChromosomeSequence, GenomePosition};
    use crate::index::build_positional_index_for_tests;

    fn seed_cfg() -> SeedConfig {
        SeedConfig {
            hashlen: 6,
            f2_seed_width: 6,
            f2_seed_position: (0..6).collect(),
            seed_length: 6,
        }
    }

    fn index_for(seq: &str) -> Index {
        let cfg = seed_cfg();
        let ct_image = GenomeImage {
            chromosomes: vec![ChromosomeSequence { sequence: convert_ct(seq.as_bytes()) }],
        };
        let ga_image = GenomeImage {
            chromosomes: vec![ChromosomeSequence { sequence: convert_ga(seq.as_bytes()) }],
        };
        let ct_index = build_positional_index_for_tests(&ct_image, &cfg);
        let ga_index = build_positional_index_for_tests(&ga_image, &cfg);
        Index {
            version: crate::index::INDEX_VERSION,
            seed_cfg: cfg,
            genome: Genome { chromosomes: vec![ChromosomeInfo { name: "chr1".into(), length: seq.len() as u32 }] },
            ct_image,
            ga_image,
            ct_index,
            ga_index,
        }
    }

    #[test]
    fn unique_exact_match_scenario_1() {
        // spec.md §8 scenario 1
        let index = index_for("AAACCGGTT");
        let outcome = resolve_single(&index, b"AACCGG", 0, 1000, false);
        assert_eq!(outcome.classification, Classification::Unique);
        assert_eq!(outcome.best.position, Some(GenomePosition { chrom: 0, offset: 1 }));
        assert_eq!(outcome.best.strand, Strand::Forward);
    }

    #[test]
    fn ambiguous_scenario_2() {
        // spec.md §8 scenario 2
        let index = index_for("AAACCGGTTAAACCGGTT");
        let outcome = resolve_single(&index, b"AACCGG", 0, 1000, false);
        assert_eq!(outcome.classification, Classification::Ambiguous);
        assert_eq!(outcome.best.times, 2);
    }

    #[test]
    fn short_read_is_unmapped() {
        let index = index_for("AAACCGGTT");
        let outcome = resolve_single(&index, b"AAC", 2, 1000, false);
        assert_eq!(outcome.classification, Classification::Unmapped);
    }

    #[test]
    fn n_bases_count_as_t_scenario_5() {
        // spec.md §8 scenario 5: a read with Ns maps if the underlying bases
        // match after bisulfite conversion; the two Cs in "AACCGG" both
        // convert to T anyway, so replacing them with N still gives a
        // zero-mismatch alignment against the C->T image.
        let index = index_for("AAACCGGTT");
        let outcome = resolve_single(&index, b"AANNGG", 0, 1000, false);
        assert_eq!(outcome.classification, Classification::Unique);
        assert_eq!(outcome.best.mismatch, 0);
        assert_eq!(outcome.best.position, Some(GenomePosition { chrom: 0, offset: 1 }));
    }
}
