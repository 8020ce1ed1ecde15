//! The three scheduled jobs sharing the readings file.
//!
//! Each job runs once per invocation, synchronously, and finishes with a
//! [`RunOutcome`] or an error. The caller maps these to the process exit
//! status the scheduler understands.

pub mod alert;
pub mod ingest;
pub mod report;

use std::time::Duration;
use tracing::info;

/// Exit status for a run that had nothing to do.
pub const EXIT_SKIPPED: u8 = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The job completed; `emitted` counts the lines or records it produced.
    Success { emitted: usize },
    /// The job found no data and stopped early.
    Skipped { reason: String },
}

impl RunOutcome {
    pub fn skipped(reason: &str) -> Self {
        RunOutcome::Skipped {
            reason: reason.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success { .. } => 0,
            RunOutcome::Skipped { .. } => EXIT_SKIPPED,
        }
    }
}

/// Blocks the current thread for the configured pre-fetch delay, if any.
pub fn pre_fetch_delay(delay: Option<Duration>) {
    if let Some(delay) = delay {
        info!(delay_secs = delay.as_secs(), "Delaying data fetch");
        std::thread::sleep(delay);
    }
}
