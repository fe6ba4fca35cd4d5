use thiserror::Error;

use crate::types::{Seconds, ThreadCount};

/// Errors raised while building or deriving benchmark tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table has no thread counts or no policy columns")]
    Empty,
    #[error("policy {policy} has {actual} values but the table has {expected} thread counts")]
    RaggedSeries {
        policy: String,
        expected: usize,
        actual: usize,
    },
    #[error("thread counts must be strictly increasing, found {previous} before {next}")]
    Unordered {
        previous: ThreadCount,
        next: ThreadCount,
    },
    #[error("thread counts must be greater than zero")]
    ZeroThreads,
    #[error("no row with thread count 1 to use as the speedup baseline")]
    MissingBaseline,
    #[error("policy {0} appears more than once")]
    DuplicatePolicy(String),
    #[error("policy {policy} has invalid time {value} at {threads} threads")]
    InvalidTiming {
        policy: String,
        threads: ThreadCount,
        value: Seconds,
    },
    #[error("unknown policy {0}")]
    UnknownPolicy(String),
    #[error("failed to read table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed table JSON: {0}")]
    Json(#[from] serde_json::Error),
}
