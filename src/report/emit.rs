use anyhow::Result;
use tracing::debug;

use crate::report::types::{HourlyAverage, Report};
use crate::sink::ReportSink;

/// Formats one report line, e.g.
/// `Day 2025-01-01 Hour 15: PM2.5: 15.0, PM10: NO DATA`.
pub fn format_line(day: &str, entry: &HourlyAverage) -> String {
    format!(
        "Day {} Hour {}: PM2.5: {}, PM10: {}",
        day, entry.hour, entry.avg_pm2_5, entry.avg_pm10
    )
}

/// Sends every report entry to `sink` in report order. Returns the number of lines emitted.
#[tracing::instrument(skip_all, fields(day = %report.day()))]
pub fn emit_report<S: ReportSink + ?Sized>(report: &Report, sink: &mut S) -> Result<usize> {
    let day = report.day();
    let mut emitted = 0;

    for entry in report.iter() {
        sink.emit(&format_line(&day, entry))?;
        emitted += 1;
    }

    debug!(emitted, "Report emitted");
    Ok(emitted)
}
