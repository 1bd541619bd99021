//! Genome, chromosome and genome-position types (spec.md §3).

use serde::{Deserialize, Serialize};

/// A single chromosome's converted sequence. `name`/`length` are shared
/// across both images (spec.md §3: "Both images share chromosome names and
/// lengths"); only the sequence bytes differ between the C→T and G→A
/// images, so this type stores just the bytes and the owning `GenomeImage`
/// pairs it with the shared name/length table via index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChromosomeSequence {
    pub sequence: Vec<u8>,
}

impl ChromosomeSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Name and length of a chromosome, shared between both genome images.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChromosomeInfo {
    pub name: String,
    pub length: u32,
}

/// One bisulfite-converted view of the whole genome (either the C→T or the
/// G→A image), as a sequence of per-chromosome byte arrays in the order
/// given by the shared chromosome table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenomeImage {
    pub chromosomes: Vec<ChromosomeSequence>,
}

impl GenomeImage {
    pub fn chromosome(&self, chrom_id: u32) -> &ChromosomeSequence {
        &self.chromosomes[chrom_id as usize]
    }
}

/// Chromosome names and lengths, numbered 0..K-1 in index order (spec.md
/// §3). Shared by both genome images.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Genome {
    pub chromosomes: Vec<ChromosomeInfo>,
}

impl Genome {
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn chromosome_length(&self, chrom_id: u32) -> u32 {
        self.chromosomes[chrom_id as usize].length
    }

    pub fn chromosome_name(&self, chrom_id: u32) -> &str {
        &self.chromosomes[chrom_id as usize].name
    }
}

/// A position on the genome: chromosome id plus 0-based offset within it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct GenomePosition {
    pub chrom: u32,
    pub offset: u32,
}

/// Which strand (relative to the read's original orientation) an alignment
/// came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genome_lookup_by_chrom_id() {
        let genome = Genome {
            chromosomes: vec![
                ChromosomeInfo { name: "chr1".into(), length: 9 },
                ChromosomeInfo { name: "chr2".into(), length: 18 },
            ],
        };
        assert_eq!(genome.chromosome_name(1), "chr2");
        assert_eq!(genome.chromosome_length(0), 9);
    }
}
