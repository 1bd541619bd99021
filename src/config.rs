//! Run configuration and CLI-argument validation (spec.md §6/§7). Collects
//! every check that spec.md §7 calls a "configuration error" into one
//! place, rather than scattering it through `main()`.

use crate::error::{SeedmapError, SeedmapResult};
use crate::resolve_paired::FragRange;
use clap::ArgMatches;

/// Single-end or paired-end reads input, already split on commas for
/// multi-input runs (spec.md §6 "Paired-end input is two parallel files in
/// the same order").
#[derive(Clone, Debug)]
pub enum ReadsInput {
    Single(Vec<String>),
    Paired(Vec<String>, Vec<String>),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub index_path: String,
    pub output_path: String,
    pub reads: ReadsInput,
    pub max_mismatches: u32,
    pub n_reads_to_process: usize,
    pub bucket_cap: usize,
    pub top_k: usize,
    pub frag_range: FragRange,
    pub num_threads: usize,
    pub wildcard: bool,
    pub adapter: Option<Vec<u8>>,
    pub write_ambiguous: bool,
    pub write_unmapped: bool,
}

const MAX_BATCH_SIZE: usize = 5_000_000;
const MIN_TOP_K: usize = 2;
const MAX_TOP_K: usize = 300;

impl Config {
    pub fn from_args(args: &ArgMatches) -> SeedmapResult<Config> {
        let index_path = args.value_of("INDEX").unwrap().to_owned();
        if !index_path.ends_with(".dbindex") {
            return Err(SeedmapError::Config(format!("index path must end in .dbindex: {}", index_path)));
        }

        let output_path = args.value_of("OUTPUT").unwrap().to_owned();

        let reads = Config::parse_reads(args)?;

        let max_mismatches = parse_with_default(args, "MAX_MISMATCHES", 6)?;

        let n_reads_to_process = {
            let requested: usize = parse_with_default(args, "BATCH_SIZE", 1_000_000)?;
            if requested > MAX_BATCH_SIZE {
                warn!("n_reads_to_process {} exceeds cap, clamping to {}", requested, MAX_BATCH_SIZE);
                MAX_BATCH_SIZE
            } else {
                requested
            }
        };

        let bucket_cap = parse_with_default(args, "BUCKET_CAP", 5000)?;

        let top_k: usize = parse_with_default(args, "TOP_K", 50)?;
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&top_k) {
            return Err(SeedmapError::Config(format!(
                "top-k must be between {} and {}, got {}",
                MIN_TOP_K, MAX_TOP_K, top_k
            )));
        }

        let frag_max: u32 = parse_with_default(args, "FRAG_RANGE", 1000)?;
        let frag_range = FragRange { min: 0, max: frag_max };

        let num_threads: usize = parse_with_default(args, "NUM_THREADS", 1)?;
        if num_threads == 0 {
            return Err(SeedmapError::Config("thread count must be at least 1".into()));
        }

        let wildcard = args.is_present("WILDCARD");
        if wildcard && matches!(reads, ReadsInput::Paired(..)) {
            return Err(SeedmapError::Config("A/G wildcard mode has no effect in paired-end mode".into()));
        }

        let adapter = args.value_of("ADAPTER").map(|s| s.as_bytes().to_vec());
        let write_ambiguous = args.is_present("WRITE_AMBIGUOUS");
        let write_unmapped = args.is_present("WRITE_UNMAPPED");

        Ok(Config {
            index_path,
            output_path,
            reads,
            max_mismatches,
            n_reads_to_process,
            bucket_cap,
            top_k,
            frag_range,
            num_threads,
            wildcard,
            adapter,
            write_ambiguous,
            write_unmapped,
        })
    }

    fn parse_reads(args: &ArgMatches) -> SeedmapResult<ReadsInput> {
        let single = args.value_of("READS");
        let mate1 = args.value_of("MATE1");
        let mate2 = args.value_of("MATE2");

        match (single, mate1, mate2) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(SeedmapError::Config(
                "--reads is mutually exclusive with --mate1/--mate2".into(),
            )),
            (Some(reads), None, None) => {
                let paths = split_paths(reads);
                validate_suffixes(&paths)?;
                Ok(ReadsInput::Single(paths))
            }
            (None, Some(mate1), Some(mate2)) => {
                let p1 = split_paths(mate1);
                let p2 = split_paths(mate2);
                validate_suffixes(&p1)?;
                validate_suffixes(&p2)?;
                if p1.len() != p2.len() {
                    return Err(SeedmapError::Config(format!(
                        "mate-1 and mate-2 file lists differ in length: {} vs {}",
                        p1.len(),
                        p2.len()
                    )));
                }
                Ok(ReadsInput::Paired(p1, p2))
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err(SeedmapError::Config("paired-end mode requires both --mate1 and --mate2".into()))
            }
            (None, None, None) => Err(SeedmapError::Config("one of --reads or --mate1/--mate2 is required".into())),
        }
    }
}

fn split_paths(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_owned()).collect()
}

fn validate_suffixes(paths: &[String]) -> SeedmapResult<()> {
    for path in paths {
        if !(path.ends_with(".fastq") || path.ends_with(".fq") || path.ends_with(".fastq.gz") || path.ends_with(".fq.gz")) {
            return Err(SeedmapError::Config(format!("reads file must end in .fastq or .fq: {}", path)));
        }
    }
    Ok(())
}

fn parse_with_default<T: std::str::FromStr>(args: &ArgMatches, key: &str, default: T) -> SeedmapResult<T> {
    match args.value_of(key) {
        Some(s) => s
            .parse::<T>()
            .map_err(|_| SeedmapError::Config(format!("invalid value for {}: {}", key, s))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_paths_trims_and_splits_commas() {
        assert_eq!(split_paths("a.fastq, b.fastq"), vec!["a.fastq", "b.fastq"]);
    }

    #[test]
    fn validate_suffixes_rejects_bad_extension() {
        let err = validate_suffixes(&["reads.txt".to_owned()]).unwrap_err();
        match err {
            SeedmapError::Config(_) => (),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn validate_suffixes_accepts_gz() {
        assert!(validate_suffixes(&["reads.fastq.gz".to_owned()]).is_ok());
    }
}
