//! Batch pipeline: read, shard, resolve, write in original order (spec.md
//! §4.6). Each batch is sharded across scoped threads via `std::thread::scope`
//! (see DESIGN.md and SPEC_FULL.md §5) so each worker owns a disjoint mutable
//! slice of a pre-sized result array instead of streaming through a channel.

use crate::config::{Config, ReadsInput};
use crate::error::{SeedmapError, SeedmapResult};
use crate::fastq::{self, ReadRecord};
use crate::index::Index;
use crate::output::{self, MappedRecord, OutputFormat, FIRST_IN_PAIR, SECOND_IN_PAIR};
use crate::resolve_paired::{resolve_paired, PairedEndOutcome};
use crate::resolve_single::{resolve_single, SingleEndOutcome};
use crate::verify::Classification;
use bio::io::fastq as bio_fastq;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

pub fn run(config: &Config, index: &Index) -> SeedmapResult<()> {
    match &config.reads {
        ReadsInput::Single(paths) => run_single(config, index, paths),
        ReadsInput::Paired(mate1_paths, mate2_paths) => run_paired(config, index, mate1_paths, mate2_paths),
    }
}

struct AuxWriters {
    main: BufWriter<File>,
    format: OutputFormat,
    ambiguous: Option<BufWriter<File>>,
    unmapped: Option<BufWriter<File>>,
}

impl AuxWriters {
    fn open(config: &Config, index: &Index, output_path: &str) -> SeedmapResult<AuxWriters> {
        let format = OutputFormat::from_path(output_path);
        let mut main = BufWriter::new(File::create(output_path)?);
        if format == OutputFormat::Sam {
            output::write_sam_header(&mut main, &index.genome)?;
        }
        let ambiguous = if config.write_ambiguous {
            Some(BufWriter::new(File::create(output::derive_path(output_path, "_amb"))?))
        } else {
            None
        };
        let unmapped = if config.write_unmapped {
            Some(BufWriter::new(File::create(output::derive_path(output_path, "_unmapped"))?))
        } else {
            None
        };
        Ok(AuxWriters { main, format, ambiguous, unmapped })
    }
}

fn run_single(config: &Config, index: &Index, paths: &[String]) -> SeedmapResult<()> {
    let multi = paths.len() > 1;
    for (i, path) in paths.iter().enumerate() {
        let out_path = if multi {
            output::derive_path(&config.output_path, &format!("_s{}", i))
        } else {
            config.output_path.clone()
        };
        let mut writers = AuxWriters::open(config, index, &out_path)?;

        let mut reader = bio_fastq::Reader::new(fastq::open_maybe_gz(path)?);
        let timer = Instant::now();
        let mut total = 0usize;

        loop {
            let batch = fastq::read_batch(&mut reader, config.n_reads_to_process)?;
            if batch.is_empty() {
                break;
            }
            let batch = clip_batch(config, batch);
            let outcomes = resolve_single_batch(config, index, &batch);

            for (record, outcome) in batch.iter().zip(outcomes.iter()) {
                write_single_outcome(&mut writers, index, record, outcome)?;
            }
            total += batch.len();
        }

        info!("{}: mapped {} reads in {:.3}s", path, total, timer.elapsed().as_secs_f32());
    }
    Ok(())
}

fn run_paired(config: &Config, index: &Index, mate1_paths: &[String], mate2_paths: &[String]) -> SeedmapResult<()> {
    let multi = mate1_paths.len() > 1;
    for (i, (path1, path2)) in mate1_paths.iter().zip(mate2_paths.iter()).enumerate() {
        let out_path = if multi {
            output::derive_path(&config.output_path, &format!("_p{}", i))
        } else {
            config.output_path.clone()
        };
        let mut writers = AuxWriters::open(config, index, &out_path)?;

        let mut reader1 = bio_fastq::Reader::new(fastq::open_maybe_gz(path1)?);
        let mut reader2 = bio_fastq::Reader::new(fastq::open_maybe_gz(path2)?);
        let timer = Instant::now();
        let mut total = 0usize;

        loop {
            let batch1 = fastq::read_batch(&mut reader1, config.n_reads_to_process)?;
            let batch2 = fastq::read_batch(&mut reader2, config.n_reads_to_process)?;
            if batch1.is_empty() && batch2.is_empty() {
                break;
            }
            if batch1.len() != batch2.len() {
                return Err(SeedmapError::Fastq(format!(
                    "{} and {} have mismatched record counts starting at pair {}: {} vs {} reads",
                    path1, path2, total, batch1.len(), batch2.len()
                )));
            }
            let batch1 = clip_batch(config, batch1);
            let batch2 = clip_batch(config, batch2);
            let outcomes = resolve_paired_batch(config, index, &batch1, &batch2);

            for ((r1, r2), outcome) in batch1.iter().zip(batch2.iter()).zip(outcomes.iter()) {
                write_paired_outcome(&mut writers, index, r1, r2, outcome)?;
            }
            total += batch1.len();
        }

        info!("{} + {}: mapped {} pairs in {:.3}s", path1, path2, total, timer.elapsed().as_secs_f32());
    }
    Ok(())
}

fn clip_batch(config: &Config, mut batch: Vec<ReadRecord>) -> Vec<ReadRecord> {
    if let Some(adapter) = &config.adapter {
        for record in &mut batch {
            fastq::clip_adapter(&mut record.seq, adapter);
        }
    }
    batch
}

/// Shard `batch` into `config.num_threads` contiguous chunks and resolve
/// each shard on its own scoped thread, writing directly into the matching
/// slice of a pre-sized result array (spec.md §4.6 step 4/§5).
fn resolve_single_batch(config: &Config, index: &Index, batch: &[ReadRecord]) -> Vec<SingleEndOutcome> {
    if batch.is_empty() {
        return Vec::new();
    }
    let threads = config.num_threads.max(1);
    let chunk_size = ((batch.len() + threads - 1) / threads).max(1);

    let mut results: Vec<Option<SingleEndOutcome>> = (0..batch.len()).map(|_| None).collect();
    std::thread::scope(|scope| {
        for (read_chunk, out_chunk) in batch.chunks(chunk_size).zip(results.chunks_mut(chunk_size)) {
            scope.spawn(move || {
                for (read, slot) in read_chunk.iter().zip(out_chunk.iter_mut()) {
                    *slot = Some(resolve_single(index, &read.seq, config.max_mismatches, config.bucket_cap, config.wildcard));
                }
            });
        }
    });
    results.into_iter().map(|o| o.expect("every slot filled by a worker")).collect()
}

fn resolve_paired_batch(config: &Config, index: &Index, batch1: &[ReadRecord], batch2: &[ReadRecord]) -> Vec<PairedEndOutcome> {
    let n = batch1.len().min(batch2.len());
    if n == 0 {
        return Vec::new();
    }
    let threads = config.num_threads.max(1);
    let chunk_size = ((n + threads - 1) / threads).max(1);

    let mut results: Vec<Option<PairedEndOutcome>> = (0..n).map(|_| None).collect();
    std::thread::scope(|scope| {
        for ((chunk1, chunk2), out_chunk) in batch1[..n]
            .chunks(chunk_size)
            .zip(batch2[..n].chunks(chunk_size))
            .zip(results.chunks_mut(chunk_size))
        {
            scope.spawn(move || {
                for ((r1, r2), slot) in chunk1.iter().zip(chunk2.iter()).zip(out_chunk.iter_mut()) {
                    *slot = Some(resolve_paired(
                        index,
                        &r1.seq,
                        &r2.seq,
                        config.max_mismatches,
                        config.top_k,
                        config.bucket_cap,
                        config.frag_range,
                    ));
                }
            });
        }
    });
    results.into_iter().map(|o| o.expect("every slot filled by a worker")).collect()
}

fn write_single_outcome(writers: &mut AuxWriters, index: &Index, record: &ReadRecord, outcome: &SingleEndOutcome) -> SeedmapResult<()> {
    match outcome.classification {
        Classification::Unique => {
            let mapped = MappedRecord {
                name: &record.name,
                seq: &record.seq,
                position: outcome.best.position.expect("unique classification implies a position"),
                mismatch: outcome.best.mismatch,
                strand: outcome.best.strand,
            };
            output::write_single_mapped(&mut writers.main, writers.format, &index.genome, &mapped)
        }
        Classification::Ambiguous => {
            if let (Some(writer), Some(position)) = (writers.ambiguous.as_mut(), outcome.best.position) {
                let mapped = MappedRecord {
                    name: &record.name,
                    seq: &record.seq,
                    position,
                    mismatch: outcome.best.mismatch,
                    strand: outcome.best.strand,
                };
                output::write_single_mapped(writer, writers.format, &index.genome, &mapped)
            } else {
                Ok(())
            }
        }
        Classification::Unmapped => {
            if let Some(writer) = writers.unmapped.as_mut() {
                output::write_single_unmapped(writer, writers.format, &record.name, &record.seq)
            } else {
                Ok(())
            }
        }
    }
}

fn write_paired_outcome(
    writers: &mut AuxWriters,
    index: &Index,
    r1: &ReadRecord,
    r2: &ReadRecord,
    outcome: &PairedEndOutcome,
) -> SeedmapResult<()> {
    match outcome.classification {
        Classification::Unique | Classification::Ambiguous => {
            let (mate1, mate2) = match (outcome.best.mate1, outcome.best.mate2) {
                (Some(a), Some(b)) => (a, b),
                _ => return Ok(()),
            };
            let writer = match outcome.classification {
                Classification::Unique => &mut writers.main,
                _ => match writers.ambiguous.as_mut() {
                    Some(w) => w,
                    None => return Ok(()),
                },
            };
            let rec1 = MappedRecord { name: &r1.name, seq: &r1.seq, position: mate1.position, mismatch: mate1.mismatch, strand: mate1.strand };
            let rec2 = MappedRecord { name: &r2.name, seq: &r2.seq, position: mate2.position, mismatch: mate2.mismatch, strand: mate2.strand };
            output::write_paired_mapped(writer, writers.format, &index.genome, &rec1, FIRST_IN_PAIR, mate2.position)?;
            output::write_paired_mapped(writer, writers.format, &index.genome, &rec2, SECOND_IN_PAIR, mate1.position)
        }
        Classification::Unmapped => {
            if let Some(writer) = writers.unmapped.as_mut() {
                output::write_single_unmapped(writer, writers.format, &r1.name, &r1.seq)?;
                output::write_single_unmapped(writer, writers.format, &r2.name, &r2.seq)
            } else {
                Ok(())
            }
        }
    }
}
