//! Error types shared across the index, mapper and SeedDB subsystems.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A malformed record in a SeedDB index or seeds file.
    #[error("problem parsing record: '{0}'")]
    Parse(String),

    /// The index file contains no sequence records.
    #[error("there are no sequences in the input index")]
    EmptyIndex,

    /// An accessor was given an ordinal outside its table.
    #[error("invalid {what}: id = {id}, table size = {len}")]
    IndexOutOfRange {
        what: &'static str,
        id: i32,
        len: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A subsequence fetch with inconsistent bounds.
    #[error("invalid subsequence range: start = {start}, end = {end}, seq len = {len}")]
    InvalidRange { start: i32, end: i32, len: i32 },

    /// An internal consistency check failed; treated as a bug in the caller's data.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
