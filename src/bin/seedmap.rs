#[macro_use]
extern crate log;

extern crate clap;
extern crate seedmap;

use clap::{App, Arg};
use seedmap::config::Config;
use seedmap::index::Index;
use seedmap::{pipeline, util};

fn main() {
    let args = App::new("seedmap")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Bisulfite-aware seed-and-extend short read mapper.")
        .arg(Arg::with_name("INDEX")
            .short("i")
            .long("index")
            .help("Path to the .dbindex reference index.")
            .takes_value(true)
            .required(true))
        .arg(Arg::with_name("OUTPUT")
            .short("o")
            .long("output")
            .help("Path to write mapped output (SAM, or .mr for the minimal format).")
            .takes_value(true)
            .required(true))
        .arg(Arg::with_name("READS")
            .short("r")
            .long("reads")
            .help("Single-end FASTQ input (comma-separated for multiple files).")
            .takes_value(true)
            .required_unless_one(&["MATE1", "MATE2"])
            .conflicts_with_all(&["MATE1", "MATE2"]))
        .arg(Arg::with_name("MATE1")
            .long("mate1")
            .help("Paired-end mate-1 FASTQ input (comma-separated).")
            .takes_value(true)
            .requires("MATE2")
            .conflicts_with("READS"))
        .arg(Arg::with_name("MATE2")
            .long("mate2")
            .help("Paired-end mate-2 FASTQ input (comma-separated).")
            .takes_value(true)
            .requires("MATE1")
            .conflicts_with("READS"))
        .arg(Arg::with_name("MAX_MISMATCHES")
            .short("n")
            .long("max-mismatches")
            .takes_value(true)
            .help("Maximum Hamming-distance mismatches per alignment.")
            .default_value("6"))
        .arg(Arg::with_name("BATCH_SIZE")
            .long("batch-size")
            .takes_value(true)
            .help("Reads processed per batch (capped at 5,000,000).")
            .default_value("1000000"))
        .arg(Arg::with_name("BUCKET_CAP")
            .short("b")
            .long("bucket-cap")
            .takes_value(true)
            .help("Skip a seed offset once its refined bucket exceeds this many candidates.")
            .default_value("5000"))
        .arg(Arg::with_name("TOP_K")
            .short("k")
            .long("top-k")
            .takes_value(true)
            .help("Per-mate candidate list size for paired-end resolution (2-300).")
            .default_value("50"))
        .arg(Arg::with_name("FRAG_RANGE")
            .long("frag-range")
            .takes_value(true)
            .help("Maximum fragment length for paired-end resolution.")
            .default_value("1000"))
        .arg(Arg::with_name("NUM_THREADS")
            .short("t")
            .long("threads")
            .takes_value(true)
            .help("Number of worker threads per batch.")
            .default_value("1"))
        .arg(Arg::with_name("WILDCARD")
            .long("wildcard")
            .help("Enable A/G wildcard mode (single-end only)."))
        .arg(Arg::with_name("ADAPTER")
            .long("adapter")
            .takes_value(true)
            .help("Adapter sequence to clip (suffix match) from each read."))
        .arg(Arg::with_name("WRITE_AMBIGUOUS")
            .long("write-ambiguous")
            .help("Write ambiguous reads to <output>_amb."))
        .arg(Arg::with_name("WRITE_UNMAPPED")
            .long("write-unmapped")
            .help("Write unmapped reads to <output>_unmapped."))
        .arg(Arg::with_name("VERBOSE")
            .short("v")
            .help("Include this flag to trigger debug-level logging."))
        .get_matches();

    util::init_logging(if args.is_present("VERBOSE") {
        log::LogLevelFilter::Debug
    } else {
        log::LogLevelFilter::Info
    });

    let exit_code = match Config::from_args(&args) {
        Err(why) => {
            error!("Configuration error: {}", why);
            1
        }
        Ok(config) => match Index::load(&config.index_path) {
            Err(why) => {
                error!("Unable to load index {}: {}", config.index_path, why);
                2
            }
            Ok(index) => match pipeline::run(&config, &index) {
                Ok(()) => 0,
                Err(why) => {
                    error!("Error running mapping pipeline: {}", why);
                    3
                }
            },
        },
    };

    std::process::exit(exit_code);
}
