//! Error types for the library boundaries.
//!
//! Parsing and sensor access fail with typed errors; the binary wraps them
//! in `anyhow` and turns them into a failed run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading the readings file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error")]
    Csv(#[from] csv::Error),

    #[error("malformed row at line {line}: invalid {field} {value:?} ({reason})")]
    MalformedRow {
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure returned by a [`crate::sensor::SensorReader`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor {sensor_id} responded with status {status}")]
    Status { sensor_id: u32, status: u16 },

    #[error("sensor {0} unavailable")]
    Unavailable(u32),
}
