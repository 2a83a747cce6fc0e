//! Error kinds surfaced by the core, plus the I/O-boundary wrappers the
//! CLI and collaborators (fact log, columnar bridge, relational
//! persistence) need. Shape/type-inference errors are reported to the
//! caller; invariant violations inside the merge engine are programmer
//! errors (`debug_assert!`/`panic!`), never represented here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("column {0:?} contains more than one non-null scalar type")]
    HeterogeneousColumnType(String),

    #[error("column {0:?} has a scalar type outside {{int, float, string, date}}")]
    UnknownColumnType(String),

    #[error("column {0:?} has zero non-null entries; type cannot be inferred")]
    EmptyColumnType(String),

    #[error("no column named {0:?} in this header")]
    MissingColumn(String),

    #[error("failed to parse fact log line {line}: {reason}")]
    FactLogParse { line: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
