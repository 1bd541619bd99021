//! Paired-end resolution: top-k candidate lists per mate, fragment-windowed
//! cross product, minimum-sum-of-mismatches selection (spec.md §4.5).

use crate::base::{convert_ct, convert_ga, reverse_complement};
use crate::genome::{Genome, GenomeImage, GenomePosition, Strand};
use crate::index::{Index, PositionalIndex};
use crate::seed::{SeedConfig, NUM_SEED_OFFSETS};
use crate::seeder::seed_candidates;
use crate::verify::{verify, Classification};

/// Inclusive fragment-length window for pairing (spec.md §4.5 step 3).
#[derive(Clone, Copy, Debug)]
pub struct FragRange {
    pub min: u32,
    pub max: u32,
}

impl FragRange {
    pub fn contains(&self, len: u32) -> bool {
        len >= self.min && len <= self.max
    }
}

/// One surviving candidate for a mate: a genomic position, its mismatch
/// count, and the strand it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub position: GenomePosition,
    pub mismatch: u32,
    pub strand: Strand,
}

/// The k best candidates for one mate, ordered by mismatch count then by
/// genomic position (spec.md §4.5 step 1). `k` is the target size, but a
/// candidate tying the k-th place's mismatch count is always retained
/// rather than dropped, so the list can grow past `k` when ties occur at
/// the boundary (spec.md §9 "Paired top-k tie-breaking": silently dropping
/// a tie at the cutoff would under-count paired-end ambiguity).
#[derive(Clone, Debug)]
pub struct TopK {
    k: usize,
    max_mismatches: u32,
    entries: Vec<Candidate>,
}

impl TopK {
    pub fn new(k: usize, max_mismatches: u32) -> TopK {
        TopK { k, max_mismatches, entries: Vec::with_capacity(k) }
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    /// Fold a verified candidate into the list. The same genomic position
    /// can be reached from more than one seed offset or strand scan; when it
    /// is, keep only the lower mismatch count rather than double-counting
    /// the position as two separate candidates.
    pub fn offer(&mut self, position: GenomePosition, mismatch: u32, strand: Strand) {
        if mismatch > self.max_mismatches {
            return;
        }
        if let Some(existing) = self.entries.iter_mut().find(|c| c.position == position) {
            if mismatch < existing.mismatch {
                existing.mismatch = mismatch;
                existing.strand = strand;
            }
            return;
        }

        if self.entries.len() >= self.k {
            let cutoff = self.entries[self.k - 1].mismatch;
            if mismatch > cutoff {
                return;
            }
        }
        self.entries.push(Candidate { position, mismatch, strand });
        self.sort();
        self.drop_below_cutoff();
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.mismatch.cmp(&b.mismatch).then(a.position.cmp(&b.position)));
    }

    /// After insertion, entries past index `k - 1` are kept only while they
    /// tie the k-th place's mismatch count; anything strictly worse than
    /// that tie value is dropped.
    fn drop_below_cutoff(&mut self) {
        if self.entries.len() <= self.k {
            return;
        }
        let cutoff = self.entries[self.k - 1].mismatch;
        let cut = self.entries.iter().position(|c| c.mismatch > cutoff).unwrap_or(self.entries.len());
        self.entries.truncate(cut);
    }
}

/// Best surviving pair across the mate-1 x mate-2 cross product, with the
/// same tie-counting semantics as `BestMatch` (spec.md §4.5 step 4).
#[derive(Clone, Copy, Debug)]
pub struct PairedMatch {
    pub mate1: Option<Candidate>,
    pub mate2: Option<Candidate>,
    pub mismatch: u32,
    pub times: u32,
}

impl PairedMatch {
    pub fn initial(max_mismatches: u32) -> PairedMatch {
        PairedMatch { mate1: None, mate2: None, mismatch: 2 * max_mismatches + 1, times: 0 }
    }

    pub fn update(&mut self, mate1: Candidate, mate2: Candidate, mismatch: u32) {
        if self.times == 0 || mismatch < self.mismatch {
            self.mate1 = Some(mate1);
            self.mate2 = Some(mate2);
            self.mismatch = mismatch;
            self.times = 1;
        } else if mismatch == self.mismatch
            && (self.mate1.map(|c| c.position) != Some(mate1.position) || self.mate2.map(|c| c.position) != Some(mate2.position))
        {
            self.mate1 = Some(mate1);
            self.mate2 = Some(mate2);
            self.times += 1;
        }
    }

    /// Classified against `2 * max_mismatches` (the worst either mate could
    /// individually contribute while still surviving its own top-k list);
    /// spec.md names no separate combined threshold, see DESIGN.md.
    pub fn classify(&self, max_mismatches: u32) -> Classification {
        if self.times == 0 || self.mismatch > 2 * max_mismatches {
            Classification::Unmapped
        } else if self.times == 1 {
            Classification::Unique
        } else {
            Classification::Ambiguous
        }
    }
}

/// Outcome of paired-end resolution for one mate pair.
#[derive(Clone, Copy, Debug)]
pub struct PairedEndOutcome {
    pub best: PairedMatch,
    pub classification: Classification,
}

/// Resolve a mate pair against `index`. `mate1`/`mate2` are raw (unconverted)
/// ASCII sequences. Mate 1 is scanned on the C→T image, mate 2 on the G→A
/// image (spec.md §4.5 step 2).
pub fn resolve_paired(
    index: &Index,
    mate1: &[u8],
    mate2: &[u8],
    max_mismatches: u32,
    k: usize,
    bucket_cap: usize,
    frag_range: FragRange,
) -> PairedEndOutcome {
    let top1 = topk_for_mate1(index, mate1, max_mismatches, k, bucket_cap);
    let top2 = topk_for_mate2(index, mate2, max_mismatches, k, bucket_cap);

    let mut best = PairedMatch::initial(max_mismatches);
    for a in top1.entries() {
        for b in top2.entries() {
            if a.position.chrom != b.position.chrom {
                continue;
            }
            let len = fragment_length(a.position.offset, mate1.len() as u32, b.position.offset, mate2.len() as u32);
            if !frag_range.contains(len) {
                continue;
            }
            best.update(*a, *b, a.mismatch + b.mismatch);
        }
    }

    let classification = best.classify(max_mismatches);
    PairedEndOutcome { best, classification }
}

/// Distance between the outermost endpoints of the two alignments on their
/// shared chromosome (spec.md §4.5 step 3).
fn fragment_length(start_a: u32, len_a: u32, start_b: u32, len_b: u32) -> u32 {
    let end_a = start_a + len_a;
    let end_b = start_b + len_b;
    end_a.max(end_b) - start_a.min(start_b)
}

/// Build mate 1's top-k list: forward + reverse-complement scan of the C→T
/// image.
pub fn topk_for_mate1(index: &Index, read: &[u8], max_mismatches: u32, k: usize, bucket_cap: usize) -> TopK {
    let mut topk = TopK::new(k, max_mismatches);
    let rc = reverse_complement(read);
    collect_candidates(
        &index.ct_index,
        &index.ct_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ct(read),
        Strand::Forward,
        bucket_cap,
        max_mismatches,
        &mut topk,
    );
    collect_candidates(
        &index.ct_index,
        &index.ct_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ct(&rc),
        Strand::Reverse,
        bucket_cap,
        max_mismatches,
        &mut topk,
    );
    topk
}

/// Build mate 2's top-k list: forward + reverse-complement scan of the G→A
/// image.
pub fn topk_for_mate2(index: &Index, read: &[u8], max_mismatches: u32, k: usize, bucket_cap: usize) -> TopK {
    let mut topk = TopK::new(k, max_mismatches);
    let rc = reverse_complement(read);
    collect_candidates(
        &index.ga_index,
        &index.ga_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ga(read),
        Strand::Forward,
        bucket_cap,
        max_mismatches,
        &mut topk,
    );
    collect_candidates(
        &index.ga_index,
        &index.ga_image,
        &index.genome,
        &index.seed_cfg,
        &convert_ga(&rc),
        Strand::Reverse,
        bucket_cap,
        max_mismatches,
        &mut topk,
    );
    topk
}

fn collect_candidates(
    pos_index: &PositionalIndex,
    image: &GenomeImage,
    genome: &Genome,
    seed_cfg: &SeedConfig,
    converted_read: &[u8],
    strand: Strand,
    bucket_cap: usize,
    max_mismatches: u32,
    topk: &mut TopK,
) {
    for offset in 0..NUM_SEED_OFFSETS {
        let (lo, hi) = match seed_candidates(pos_index, image, seed_cfg, converted_read, offset, bucket_cap) {
            Some(range) => range,
            None => continue,
        };
        for idx in lo..hi {
            let candidate = pos_index.positions.get(idx);
            if let Some(count) = verify(image, genome, converted_read, offset, candidate, max_mismatches) {
                topk.offer(candidate, count, strand);
            }
        }
    }
}
