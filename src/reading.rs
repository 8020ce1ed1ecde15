//! Sensor readings and the CSV parse boundary.
//!
//! Rows are deserialized as raw strings and converted into a typed
//! [`Reading`] immediately, so a malformed field fails the whole load
//! instead of travelling further down the pipeline.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::SourceError;

/// Timestamp layout written by the ingest job (`+0000` style offset).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One PM2.5 / PM10 sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<FixedOffset>,
    pub pm2_5: f64,
    pub pm10: f64,
    pub sensor_id: Option<String>,
}

impl Reading {
    pub fn new(timestamp: DateTime<FixedOffset>, pm2_5: f64, pm10: f64) -> Self {
        Self {
            timestamp,
            pm2_5,
            pm10,
            sensor_id: None,
        }
    }
}

/// A row exactly as it appears in the file.
#[derive(Debug, Deserialize)]
struct RawReading {
    timestamp: String,
    pm2_5: String,
    pm10: String,
    #[serde(default)]
    sensor_id: Option<String>,
}

impl RawReading {
    fn into_reading(self, line: u64) -> Result<Reading, SourceError> {
        let timestamp =
            parse_timestamp(&self.timestamp).map_err(|e| SourceError::MalformedRow {
                line,
                field: "timestamp",
                value: self.timestamp.clone(),
                reason: e.to_string(),
            })?;

        Ok(Reading {
            timestamp,
            pm2_5: parse_measure("pm2_5", &self.pm2_5, line)?,
            pm10: parse_measure("pm10", &self.pm10, line)?,
            sensor_id: self.sensor_id.filter(|s| !s.is_empty()),
        })
    }
}

/// Parses an offset-carrying timestamp.
///
/// Accepts RFC 3339 (`2025-01-01T13:00:00+00:00`) as well as
/// [`TIMESTAMP_FORMAT`] (`2025-01-01T13:00:00+0000`).
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s).or_else(|_| DateTime::parse_from_str(s, TIMESTAMP_FORMAT))
}

fn parse_measure(field: &'static str, value: &str, line: u64) -> Result<f64, SourceError> {
    let malformed = |reason: String| SourceError::MalformedRow {
        line,
        field,
        value: value.to_string(),
        reason,
    };

    let parsed: f64 = value.trim().parse().map_err(|e| malformed(format!("{e}")))?;
    if !parsed.is_finite() {
        return Err(malformed("not a finite number".into()));
    }
    Ok(parsed)
}

/// Parses every row of a headered CSV stream into readings, in file order.
///
/// # Errors
///
/// Returns [`SourceError::MalformedRow`] for the first row whose timestamp
/// or measures do not parse, and [`SourceError::Csv`] for structural problems
/// such as a missing column.
pub fn read_readings<R: Read>(reader: R) -> Result<Vec<Reading>, SourceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut readings = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawReading = record.deserialize(Some(&headers))?;
        readings.push(raw.into_reading(line)?);
    }

    Ok(readings)
}

/// Loads all readings from `path`.
///
/// Returns `Ok(None)` when the file does not exist, which callers treat as
/// "no data available" rather than a failure.
pub fn load_readings(path: &Path) -> Result<Option<Vec<Reading>>, SourceError> {
    if !path.is_file() {
        debug!(path = %path.display(), "Readings file not found");
        return Ok(None);
    }

    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let readings = read_readings(file)?;
    debug!(path = %path.display(), rows = readings.len(), "Readings loaded");

    Ok(Some(readings))
}
