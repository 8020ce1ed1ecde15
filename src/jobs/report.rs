use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::{RunOutcome, pre_fetch_delay};
use crate::notify::{AQ_REPORT, DatasetEvent, DatasetNotifier};
use crate::output::write_report_json;
use crate::report::{aggregate_hourly, emit_report, extract_window};
use crate::sink::ReportSink;

pub const PRODUCER: &str = "create_aq_report";

#[derive(Debug, Clone)]
pub struct ReportParams {
    pub data_path: PathBuf,
    pub run_time: DateTime<FixedOffset>,
    pub fetch_delay: Option<Duration>,
    pub json_out: Option<PathBuf>,
}

/// Extract, aggregate and emit the hourly report, then announce `aq_report`.
///
/// Skips without emitting anything when the readings file is absent. A
/// malformed row fails the run before any line is emitted.
#[tracing::instrument(skip_all, fields(run_time = %params.run_time))]
pub fn run_report<S, N>(params: &ReportParams, sink: &mut S, notifier: &mut N) -> Result<RunOutcome>
where
    S: ReportSink + ?Sized,
    N: DatasetNotifier + ?Sized,
{
    pre_fetch_delay(params.fetch_delay);

    let Some(window) = extract_window(&params.data_path, params.run_time)
        .with_context(|| format!("failed to load {}", params.data_path.display()))?
    else {
        return Ok(RunOutcome::skipped("No air quality data available"));
    };

    let report = aggregate_hourly(&window, params.run_time);
    info!(readings = window.len(), "Hourly averages computed");

    if let Some(path) = &params.json_out {
        write_report_json(path, &report)?;
    }

    let emitted = emit_report(&report, sink)?;
    notifier.notify(&DatasetEvent::new(AQ_REPORT, PRODUCER, params.run_time))?;

    Ok(RunOutcome::Success { emitted })
}
