//! Hamming-distance verification and the best-match record (spec.md §3/§4.3).

use crate::genome::{Genome, GenomeImage, GenomePosition, Strand};

/// Tuple (chromosome-id, chromosome-offset, times, mismatch, strand) from
/// spec.md §3. `times == 0` means unmapped, `times == 1` means unique,
/// `times > 1` means ambiguous.
#[derive(Clone, Copy, Debug)]
pub struct BestMatch {
    pub position: Option<GenomePosition>,
    pub times: u32,
    pub mismatch: u32,
    pub strand: Strand,
}

impl BestMatch {
    /// `mismatch = max_mismatches + 1`, `times = 0` (spec.md §3).
    pub fn initial(max_mismatches: u32) -> BestMatch {
        BestMatch {
            position: None,
            times: 0,
            mismatch: max_mismatches + 1,
            strand: Strand::Forward,
        }
    }

    /// Fold a verified candidate into this record, per spec.md §4.3's update
    /// rule. `count` must already be `<= self.mismatch` (the verifier only
    /// ever returns counts within the current bound), so the only two cases
    /// are "strictly better" and "tied".
    pub fn update(&mut self, pos: GenomePosition, count: u32, strand: Strand) {
        if self.position.is_none() || count < self.mismatch {
            self.position = Some(pos);
            self.mismatch = count;
            self.times = 1;
            self.strand = strand;
        } else if count == self.mismatch && self.position != Some(pos) {
            self.times += 1;
            self.position = Some(pos);
            self.strand = strand;
        }
    }

    /// Classification per spec.md §4.4 step 6: unique / ambiguous / unmapped.
    pub fn classify(&self, max_mismatches: u32) -> Classification {
        if self.times == 0 || self.mismatch > max_mismatches {
            Classification::Unmapped
        } else if self.times == 1 {
            Classification::Unique
        } else {
            Classification::Ambiguous
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Unique,
    Ambiguous,
    Unmapped,
}

/// Compute the Hamming distance between `read` (already bisulfite-converted)
/// and the reference image at `candidate`, anchored so that `candidate`
/// corresponds to seed offset `seed_offset` within `read` (spec.md §4.3).
///
/// Returns `None` if the candidate falls off either end of its chromosome,
/// or if the running mismatch count exceeds `prune_above` partway through
/// the walk (the mismatch-pruning short circuit).
pub fn verify(
    image: &GenomeImage,
    genome: &Genome,
    read: &[u8],
    seed_offset: usize,
    candidate: GenomePosition,
    prune_above: u32,
) -> Option<u32> {
    if (candidate.offset as usize) < seed_offset {
        return None;
    }
    let start = candidate.offset as usize - seed_offset;
    let len = read.len();
    let chrom_len = genome.chromosome_length(candidate.chrom) as usize;
    if start + len >= chrom_len {
        return None;
    }

    let seq = &image.chromosome(candidate.chrom).sequence;
    let mut mismatches = 0u32;
    for i in 0..len {
        if seq[start + i] != read[i] {
            mismatches += 1;
            if mismatches > prune_above {
                return None;
            }
        }
    }
    Some(mismatches)
}
