//! Data types produced by the report pipeline.

use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder rendered for a bucket with no readings.
pub const NO_DATA: &str = "NO DATA";

/// Mean of one measure over a bucket, or the no-data marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Average {
    Numeric(f64),
    NoData,
}

impl Average {
    pub fn value(&self) -> Option<f64> {
        match self {
            Average::Numeric(v) => Some(*v),
            Average::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Average::NoData)
    }
}

impl fmt::Display for Average {
    // Debug formatting of f64 keeps a fractional digit (`15.0`, not `15`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Average::Numeric(v) => write!(f, "{v:?}"),
            Average::NoData => f.write_str(NO_DATA),
        }
    }
}

impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Average::Numeric(v) => serializer.serialize_f64(*v),
            Average::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

/// Averages for a single hour-of-day bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: u32,
    pub avg_pm2_5: Average,
    pub avg_pm10: Average,
}

/// The 24 hourly buckets of one run, current hour first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub run_time: DateTime<FixedOffset>,
    pub hours: Vec<HourlyAverage>,
}

impl Report {
    /// Looks up the bucket for `hour` (0–23).
    pub fn get(&self, hour: u32) -> Option<&HourlyAverage> {
        self.hours.iter().find(|h| h.hour == hour)
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HourlyAverage> {
        self.hours.iter()
    }

    /// Calendar date of the run in its own offset, e.g. `2025-01-02`.
    pub fn day(&self) -> String {
        self.run_time.format("%Y-%m-%d").to_string()
    }
}
