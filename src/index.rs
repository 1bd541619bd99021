//! The positional index: a hash bucket table plus a sorted position array,
//! and the on-disk `Index` bundle that ties it to a genome (spec.md §3/§6).

use crate::base::code_of;
use crate::error::*;
use crate::genome::{Genome, GenomeImage, GenomePosition};
use crate::seed::{primary_hash, SeedConfig};
use serde::{Deserialize, Serialize};

/// Struct-of-arrays position table: parallel `chrom`/`offset` columns rather
/// than a `Vec<GenomePosition>`, for cache locality during the binary-search
/// refinement loop (spec.md §9 "Position array layout"). Grounded on
/// `10XGenomics-rust-toolbox/kmer_lookup`'s packed `(kmer, chrom, pos)`
/// table and its probe-by-index access pattern.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PositionArray {
    chrom: Vec<u32>,
    offset: Vec<u32>,
}

impl PositionArray {
    pub fn len(&self) -> usize {
        self.chrom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chrom.is_empty()
    }

    pub fn get(&self, idx: usize) -> GenomePosition {
        GenomePosition {
            chrom: self.chrom[idx],
            offset: self.offset[idx],
        }
    }

    pub fn push(&mut self, pos: GenomePosition) {
        self.chrom.push(pos.chrom);
        self.offset.push(pos.offset);
    }
}

/// Bucket start-offset table: `starts[h]..starts[h + 1]` is the half-open
/// range of `PositionArray` entries whose first `f2_seed_width` reference
/// bases hash to `h`. Has `bucket_count() + 1` entries.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BucketTable {
    starts: Vec<u32>,
}

impl BucketTable {
    pub fn range(&self, hash: u32) -> (usize, usize) {
        let h = hash as usize;
        (self.starts[h] as usize, self.starts[h + 1] as usize)
    }
}

/// A hash bucket table plus the sorted position array it indexes into, for
/// one genome image (C→T or G→A).
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PositionalIndex {
    pub buckets: BucketTable,
    pub positions: PositionArray,
}

impl PositionalIndex {
    /// Refine the bucket for `hash` down to the subrange whose entries match
    /// `suffix` at every discriminator offset, per spec.md §4.2 steps 3-4.
    /// Returns a half-open `[low, high)` range into `positions`; an empty
    /// range (`low == high`) means no candidate survives.
    pub fn refine(
        &self,
        image: &GenomeImage,
        seed_cfg: &SeedConfig,
        hash: u32,
        suffix: &[u8],
    ) -> (usize, usize) {
        let (mut low, mut high) = self.buckets.range(hash);

        for &p in seed_cfg.discriminator_positions() {
            if low >= high {
                break;
            }
            // p indexes into the seed window; the caller guarantees
            // suffix.len() >= seed_cfg.seed_length before calling refine.
            let target = suffix[p];

            let at = |idx: usize| -> u8 {
                let gp = self.positions.get(idx);
                let seq = &image.chromosome(gp.chrom).sequence;
                let off = gp.offset as usize + p;
                // Past the end of the chromosome: treat as larger than any
                // base so it sorts after every real match and drops out of
                // the refined range.
                if off < seq.len() {
                    seq[off]
                } else {
                    0xff
                }
            };

            low = lower_bound(low, high, target, &at);
            high = upper_bound(low, high, target, &at);
        }

        (low, high)
    }
}

/// Leftmost index in `[lo, hi)` such that `at(idx) >= target`, assuming `at`
/// is non-decreasing over `[lo, hi)`. Returns `hi` if no such index exists.
fn lower_bound<F: Fn(usize) -> u8>(lo: usize, hi: usize, target: u8, at: &F) -> usize {
    let (mut lo, mut hi) = (lo, hi);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if at(mid) < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Leftmost index in `[lo, hi)` such that `at(idx) > target`, assuming `at`
/// is non-decreasing over `[lo, hi)`. Returns `hi` if no such index exists.
/// Combined with `lower_bound`, `[lower_bound(...), upper_bound(...))` is
/// exactly the run of entries equal to `target`.
fn upper_bound<F: Fn(usize) -> u8>(lo: usize, hi: usize, target: u8, at: &F) -> usize {
    let (mut lo, mut hi) = (lo, hi);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if at(mid) <= target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// On-disk index bundle: header (seed config), shared chromosome table, both
/// genome images, and both positional indexes (spec.md §6).
#[derive(Clone, Serialize, Deserialize)]
pub struct Index {
    pub version: u32,
    pub seed_cfg: SeedConfig,
    pub genome: Genome,
    pub ct_image: GenomeImage,
    pub ga_image: GenomeImage,
    pub ct_index: PositionalIndex,
    pub ga_index: PositionalIndex,
}

pub const INDEX_VERSION: u32 = 1;

impl Index {
    /// Load an index from disk. `path` must carry the `.dbindex` suffix
    /// (spec.md §6); this is a configuration check, performed here rather
    /// than at the CLI layer so any caller of `Index::load` gets it.
    pub fn load(path: &str) -> SeedmapResult<Index> {
        if !path.ends_with(".dbindex") {
            return Err(SeedmapError::Config(format!(
                "index path must end in .dbindex: {}",
                path
            )));
        }
        let index: Index = crate::io::from_file(path)?;
        if index.version != INDEX_VERSION {
            return Err(SeedmapError::InvalidIndex(format!(
                "unsupported index version {} (expected {})",
                index.version, INDEX_VERSION
            )));
        }
        Ok(index)
    }

    pub fn save(&self, path: &str) -> SeedmapResult<()> {
        if !path.ends_with(".dbindex") {
            return Err(SeedmapError::Config(format!(
                "index path must end in .dbindex: {}",
                path
            )));
        }
        crate::io::write_to_file(self, path)
    }
}

/// Build a `PositionalIndex` over `image` by brute-force scan of every
/// chromosome offset whose `f2_seed_width`-base prefix is a valid hash.
/// This is a test/fixture helper, not the offline index builder (which is
/// out of scope per spec.md §1); it exists so unit tests can exercise the
/// seeder/verifier against small hand-written genomes without standing up
/// a full FASTA-to-index pipeline.
#[cfg(test)]
pub fn build_positional_index_for_tests(
    image: &GenomeImage,
    seed_cfg: &SeedConfig,
) -> PositionalIndex {
    let bucket_count = seed_cfg.bucket_count();
    let mut by_bucket: Vec<Vec<GenomePosition>> = vec![Vec::new(); bucket_count];

    for (chrom_id, chrom) in image.chromosomes.iter().enumerate() {
        let seq = &chrom.sequence;
        if seq.len() < seed_cfg.seed_length {
            continue;
        }
        for start in 0..=(seq.len() - seed_cfg.seed_length) {
            let window = &seq[start..start + seed_cfg.seed_length];
            if let Some(h) = primary_hash(window, seed_cfg.f2_seed_width) {
                by_bucket[h as usize].push(GenomePosition {
                    chrom: chrom_id as u32,
                    offset: start as u32,
                });
            }
        }
    }

    let discs = seed_cfg.discriminator_positions().to_vec();
    let mut starts = Vec::with_capacity(bucket_count + 1);
    let mut positions = PositionArray::default();
    starts.push(0u32);
    for bucket in by_bucket.iter_mut() {
        bucket.sort_by(|a, b| {
            for &p in &discs {
                let ca = code_of(image.chromosome(a.chrom).sequence[a.offset as usize + p]);
                let cb = code_of(image.chromosome(b.chrom).sequence[b.offset as usize + p]);
                if ca != cb {
                    return ca.cmp(&cb);
                }
            }
            std::cmp::Ordering::Equal
        });
        for &pos in bucket.iter() {
            positions.push(pos);
        }
        starts.push(positions.len() as u32);
    }

    PositionalIndex {
        buckets: BucketTable { starts },
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::convert_ct;
    use crate::genome::ChromosomeSequence;

    fn small_image(seqs: &[&str]) -> GenomeImage {
        GenomeImage {
            chromosomes: seqs
                .iter()
                .map(|s| ChromosomeSequence { sequence: convert_ct(s.as_bytes()) })
                .collect(),
        }
    }

    fn small_seed_cfg() -> SeedConfig {
        // hash on first 2 bases, refine on the next 4 (6-base seed window).
        SeedConfig {
            hashlen: 2,
            f2_seed_width: 2,
            f2_seed_position: vec![0, 1, 2, 3, 4, 5],
            seed_length: 6,
        }
    }

    #[test]
    fn refine_finds_unique_offset() {
        // AAACCGGTT, converted C->T: AAATTGGTT
        let image = small_image(&["AAACCGGTT"]);
        let cfg = small_seed_cfg();
        let idx = build_positional_index_for_tests(&image, &cfg);

        // Looking for the seed window starting at converted-read offset 1:
        // "AATTGG" (read AACCGG converted C->T is AATTGG).
        let suffix = convert_ct(b"AACCGG");
        let hash = primary_hash(&suffix, cfg.f2_seed_width).unwrap();
        let (lo, hi) = idx.refine(&image, &cfg, hash, &suffix);
        assert_eq!(hi - lo, 1);
        let pos = idx.positions.get(lo);
        assert_eq!(pos.offset, 1);
    }

    #[test]
    fn refine_empty_bucket_returns_empty_range() {
        let image = small_image(&["AAAAAAAAAA"]);
        let cfg = small_seed_cfg();
        let idx = build_positional_index_for_tests(&image, &cfg);

        let suffix = convert_ct(b"GGGGGG");
        let hash = primary_hash(&suffix, cfg.f2_seed_width).unwrap();
        let (lo, hi) = idx.refine(&image, &cfg, hash, &suffix);
        assert_eq!(lo, hi);
    }

    #[test]
    fn refine_ambiguous_finds_both_copies() {
        let image = small_image(&["AAACCGGTTAAACCGGTT"]);
        let cfg = small_seed_cfg();
        let idx = build_positional_index_for_tests(&image, &cfg);

        let suffix = convert_ct(b"AACCGG");
        let hash = primary_hash(&suffix, cfg.f2_seed_width).unwrap();
        let (lo, hi) = idx.refine(&image, &cfg, hash, &suffix);
        assert_eq!(hi - lo, 2);
    }

    #[test]
    fn load_rejects_bad_suffix() {
        let err = Index::load("some/path.idx").unwrap_err();
        match err {
            SeedmapError::Config(_) => (),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let image = small_image(&["AAACCGGTT"]);
        let cfg = small_seed_cfg();
        let ct_index = build_positional_index_for_tests(&image, &cfg);
        let ga_image = GenomeImage {
            chromosomes: vec![ChromosomeSequence { sequence: crate::base::convert_ga(b"AAACCGGTT") }],
        };
        let ga_index = build_positional_index_for_tests(&ga_image, &cfg);

        let index = Index {
            version: INDEX_VERSION,
            seed_cfg: cfg,
            genome: Genome {
                chromosomes: vec![crate::genome::ChromosomeInfo {
                    name: "chr1".into(),
                    length: 9,
                }],
            },
            ct_image: image,
            ga_image,
            ct_index,
            ga_index,
        };

        let tmp = tempfile::NamedTempFile::new().unwrap();
        let path = format!("{}.dbindex", tmp.path().to_str().unwrap());
        index.save(&path).unwrap();
        let loaded = Index::load(&path).unwrap();
        assert_eq!(loaded.genome.chromosome_name(0), "chr1");
        std::fs::remove_file(&path).ok();
    }
}
