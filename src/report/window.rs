//! Trailing-window extraction over the readings file.

use chrono::{DateTime, Duration, FixedOffset};
use std::path::Path;
use tracing::{debug, info};

use crate::error::SourceError;
use crate::reading::{Reading, load_readings};

/// Lookback for the hourly report: the current hour plus the 23 before it.
pub const REPORT_LOOKBACK_HOURS: i64 = 23;

/// Earliest timestamp kept for a report run at `run_time`.
pub fn report_cutoff(run_time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    run_time - Duration::hours(REPORT_LOOKBACK_HOURS)
}

/// Keeps readings with `timestamp >= cutoff`, preserving order.
///
/// There is no upper bound: readings after the run time are kept.
pub fn filter_window(readings: Vec<Reading>, cutoff: DateTime<FixedOffset>) -> Vec<Reading> {
    readings
        .into_iter()
        .filter(|r| r.timestamp >= cutoff)
        .collect()
}

/// Loads `path` and returns the readings at or after `cutoff`.
///
/// `Ok(None)` means the file is absent and the run should be skipped.
#[tracing::instrument(skip_all, fields(path = %path.display(), cutoff = %cutoff))]
pub fn extract_since(
    path: &Path,
    cutoff: DateTime<FixedOffset>,
) -> Result<Option<Vec<Reading>>, SourceError> {
    let Some(readings) = load_readings(path)? else {
        info!("No air quality data available");
        return Ok(None);
    };

    let total = readings.len();
    let window = filter_window(readings, cutoff);
    debug!(total, kept = window.len(), "Window extracted");

    Ok(Some(window))
}

/// Extracts the trailing report window ending at `run_time`.
pub fn extract_window(
    path: &Path,
    run_time: DateTime<FixedOffset>,
) -> Result<Option<Vec<Reading>>, SourceError> {
    extract_since(path, report_cutoff(run_time))
}
