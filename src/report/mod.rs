//! Hourly air-quality report.
//!
//! Extracts the trailing 24-hour window from the readings file, averages
//! PM2.5 and PM10 per hour-of-day bucket, and emits one line per bucket.

pub mod aggregate;
pub mod emit;
pub mod types;
pub mod utility;
pub mod window;

pub use aggregate::aggregate_hourly;
pub use emit::emit_report;
pub use types::{Average, HourlyAverage, Report};
pub use window::extract_window;
