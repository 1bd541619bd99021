//! Result and Error types for all seedmap code.
use std::fmt;
use std::io;

#[allow(missing_docs)]
pub type SeedmapResult<T> = Result<T, SeedmapError>;

#[allow(missing_docs)]
#[derive(Debug)]
pub enum SeedmapError {
    Io(io::Error),
    Config(String),
    Serialize(bincode::Error),
    InvalidIndex(String),
    Fastq(String),
}

impl fmt::Display for SeedmapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            &SeedmapError::Io(ref e) => write!(f, "I/O problem: {}", e),
            &SeedmapError::Config(ref s) => write!(f, "Configuration error: {}", s),
            &SeedmapError::Serialize(ref e) => {
                write!(f, "Unable to serialize/deserialize item: {}", e)
            },
            &SeedmapError::InvalidIndex(ref s) => write!(f, "Invalid index file: {}", s),
            &SeedmapError::Fastq(ref s) => write!(f, "Error reading FASTQ file: {}", s),
        }
    }
}

impl std::error::Error for SeedmapError {}

impl From<io::Error> for SeedmapError {
    fn from(e: io::Error) -> Self {
        SeedmapError::Io(e)
    }
}

impl From<bincode::Error> for SeedmapError {
    fn from(e: bincode::Error) -> Self {
        SeedmapError::Serialize(e)
    }
}

impl From<bio::io::fastq::Error> for SeedmapError {
    fn from(e: bio::io::fastq::Error) -> Self {
        SeedmapError::Fastq(e.to_string())
    }
}
