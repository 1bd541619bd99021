//! Seed configuration and the primary hash.
//!
//! The geometry here mirrors spec.md §3/§4.2: a fixed-width prefix hash
//! (`F2SEEDWIGTH` bases, `HASHLEN` the resulting bucket-index width) plus a
//! fixed list of discriminator offsets used to refine a bucket by
//! successive binary search.

use serde::{Deserialize, Serialize};

/// Number of seed offsets tried per strand per image, per spec.md §4.2 step 1
/// and the "Seed-offset loop" design note in spec.md §9.
pub const NUM_SEED_OFFSETS: usize = 7;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedConfig {
    /// log2 of the number of hash buckets; the bucket table has
    /// `4^f2_seed_width` entries.
    pub hashlen: u32,
    /// Number of prefix bases hashed into the primary bucket key.
    pub f2_seed_width: usize,
    /// Permutation of offsets within the seed window; positions
    /// `[0, f2_seed_width)` are the primary hash positions (in hash order,
    /// not necessarily `0..f2_seed_width`), positions
    /// `[f2_seed_width, seed_length)` are the refinement discriminators, in
    /// the order binary search consumes them.
    pub f2_seed_position: Vec<usize>,
    /// Total bases compared during seed refinement (S in spec.md §3).
    pub seed_length: usize,
}

impl SeedConfig {
    /// Number of buckets in the primary hash table: one per possible
    /// `f2_seed_width`-base prefix.
    pub fn bucket_count(&self) -> usize {
        1usize << (2 * self.f2_seed_width)
    }

    pub fn discriminator_positions(&self) -> &[usize] {
        &self.f2_seed_position[self.f2_seed_width..self.seed_length]
    }
}

/// Compute the primary hash of a converted sequence's first `width` bases,
/// treating any non-ACGT byte (including N) as T, per spec.md §3's encoding
/// rule and the Open Question in spec.md §9 (this crate hashes N-as-T rather
/// than skipping the offset).
///
/// Returns `None` if `seq` is shorter than `width`.
pub fn primary_hash(seq: &[u8], width: usize) -> Option<u32> {
    if seq.len() < width {
        return None;
    }
    let mut h: u32 = 0;
    for &b in &seq[..width] {
        h = (h << 2) | crate::base::code_of(b) as u32;
    }
    Some(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SeedConfig {
        SeedConfig {
            hashlen: 12,
            f2_seed_width: 6,
            f2_seed_position: vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            seed_length: 10,
        }
    }

    #[test]
    fn bucket_count_is_4_pow_width() {
        assert_eq!(cfg().bucket_count(), 4096);
    }

    #[test]
    fn discriminator_positions_slice() {
        assert_eq!(cfg().discriminator_positions(), &[6, 7, 8, 9]);
    }

    #[test]
    fn primary_hash_none_on_short_seq() {
        assert_eq!(primary_hash(b"AC", 6), None);
    }

    #[test]
    fn primary_hash_treats_n_as_t() {
        let h1 = primary_hash(b"AAAAAN", 6).unwrap();
        let h2 = primary_hash(b"AAAAAT", 6).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn primary_hash_distinguishes_prefixes() {
        let h1 = primary_hash(b"AAAAAA", 6).unwrap();
        let h2 = primary_hash(b"AAAAAC", 6).unwrap();
        assert_ne!(h1, h2);
    }
}
