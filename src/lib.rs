//! Bisulfite-aware seed-and-extend short read mapper.
//!
//! See SPEC_FULL.md for the full module breakdown; DESIGN.md records how
//! each module is grounded in the source this crate was built from.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[cfg(test)]
extern crate rand;

extern crate bincode;
extern crate bio;
extern crate clap;
extern crate env_logger;
extern crate flate2;
extern crate serde;

pub mod base;
pub mod config;
pub mod error;
pub mod fastq;
pub mod genome;
pub mod index;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod resolve_paired;
pub mod resolve_single;
pub mod seed;
pub mod seeder;
pub mod util;
pub mod verify;
