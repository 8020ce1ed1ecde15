//! Dataset-updated notifications for dependent jobs.
//!
//! Each job announces the dataset it produced once it has finished
//! successfully: `aq_data` after an ingest, `aq_report` after a report,
//! `aq_alert` when an alert was raised.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

pub const AQ_DATA: &str = "aq_data";
pub const AQ_REPORT: &str = "aq_report";
pub const AQ_ALERT: &str = "aq_alert";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEvent {
    pub dataset: String,
    pub producer: String,
    pub emitted_at: DateTime<FixedOffset>,
}

impl DatasetEvent {
    pub fn new(dataset: &str, producer: &str, emitted_at: DateTime<FixedOffset>) -> Self {
        Self {
            dataset: dataset.to_string(),
            producer: producer.to_string(),
            emitted_at,
        }
    }
}

pub trait DatasetNotifier {
    fn notify(&mut self, event: &DatasetEvent) -> Result<()>;
}

/// Logs the event and nothing else.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl DatasetNotifier for TracingNotifier {
    fn notify(&mut self, event: &DatasetEvent) -> Result<()> {
        info!(
            dataset = %event.dataset,
            producer = %event.producer,
            emitted_at = %event.emitted_at,
            "Dataset updated"
        );
        Ok(())
    }
}

/// Appends each event as one JSON object per line to a file, then logs it.
///
/// Creates the file and its parent directories if needed.
#[derive(Debug)]
pub struct JsonlNotifier {
    path: PathBuf,
}

impl JsonlNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetNotifier for JsonlNotifier {
    fn notify(&mut self, event: &DatasetEvent) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        debug!(path = %self.path.display(), dataset = %event.dataset, "Dataset event appended");

        TracingNotifier.notify(event)
    }
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub events: Vec<DatasetEvent>,
}

impl DatasetNotifier for MemoryNotifier {
    fn notify(&mut self, event: &DatasetEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}
