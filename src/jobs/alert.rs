//! Short-window air-quality alert.
//!
//! Averages the readings of the last 20 minutes and raises an alert when
//! either measure exceeds its threshold.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::{RunOutcome, pre_fetch_delay};
use crate::notify::{AQ_ALERT, DatasetEvent, DatasetNotifier};
use crate::reading::Reading;
use crate::report::utility::mean;
use crate::report::window::extract_since;
use crate::sink::ReportSink;

pub const PRODUCER: &str = "send_aq_alerts";

/// The run timestamp marks the start of the previous 10-minute interval, so
/// going back another 10 minutes covers the last 20.
pub const ALERT_LOOKBACK_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub pm2_5: f64,
    pub pm10: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pm2_5: 50.0,
            pm10: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverages {
    pub avg_pm2_5: f64,
    pub avg_pm10: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Alert,
    NoAlert,
}

#[derive(Debug, Clone)]
pub struct AlertParams {
    pub data_path: PathBuf,
    pub run_time: DateTime<FixedOffset>,
    pub fetch_delay: Option<Duration>,
    pub thresholds: Thresholds,
}

pub fn alert_cutoff(run_time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    run_time - ChronoDuration::minutes(ALERT_LOOKBACK_MINUTES)
}

/// Averages both measures over `window`; `None` when it is empty.
pub fn window_averages(window: &[Reading]) -> Option<WindowAverages> {
    let pm2_5: Vec<f64> = window.iter().map(|r| r.pm2_5).collect();
    let pm10: Vec<f64> = window.iter().map(|r| r.pm10).collect();

    Some(WindowAverages {
        avg_pm2_5: mean(&pm2_5).value()?,
        avg_pm10: mean(&pm10).value()?,
    })
}

/// Strictly above either threshold raises an alert.
pub fn decide(averages: &WindowAverages, thresholds: &Thresholds) -> AlertDecision {
    if averages.avg_pm2_5 > thresholds.pm2_5 || averages.avg_pm10 > thresholds.pm10 {
        AlertDecision::Alert
    } else {
        AlertDecision::NoAlert
    }
}

pub fn format_message(decision: AlertDecision, averages: &WindowAverages) -> String {
    let prefix = match decision {
        AlertDecision::Alert => "Air quality alert!",
        AlertDecision::NoAlert => "No air quality alert needed.",
    };
    format!(
        "{} In the last 20min: {:?} µg/m³ PM2.5 and {:?} µg/m³ PM10.",
        prefix, averages.avg_pm2_5, averages.avg_pm10
    )
}

/// Runs the alert check. Alerts go to `alert_sink` and announce `aq_alert`;
/// the all-clear line goes to `info_sink` and announces nothing.
#[tracing::instrument(skip_all, fields(run_time = %params.run_time))]
pub fn run_alert<A, I, N>(
    params: &AlertParams,
    alert_sink: &mut A,
    info_sink: &mut I,
    notifier: &mut N,
) -> Result<RunOutcome>
where
    A: ReportSink + ?Sized,
    I: ReportSink + ?Sized,
    N: DatasetNotifier + ?Sized,
{
    pre_fetch_delay(params.fetch_delay);

    let Some(window) = extract_since(&params.data_path, alert_cutoff(params.run_time))
        .with_context(|| format!("failed to load {}", params.data_path.display()))?
    else {
        return Ok(RunOutcome::skipped("No air quality data available"));
    };

    let Some(averages) = window_averages(&window) else {
        info!("No readings in the last 20 minutes");
        return Ok(RunOutcome::skipped("No recent air quality readings"));
    };

    let decision = decide(&averages, &params.thresholds);
    let message = format_message(decision, &averages);
    info!(?decision, readings = window.len(), "Alert evaluated");

    match decision {
        AlertDecision::Alert => {
            alert_sink.emit(&message)?;
            notifier.notify(&DatasetEvent::new(AQ_ALERT, PRODUCER, params.run_time))?;
        }
        AlertDecision::NoAlert => info_sink.emit(&message)?,
    }

    Ok(RunOutcome::Success { emitted: 1 })
}
