use anyhow::Result;
use tracing::{info, warn};

use super::ReportSink;

/// Log level used by a [`TracingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Warn,
}

/// Emits each line as a `tracing` event under the `aq_reporter::sink` target.
#[derive(Debug, Default)]
pub struct TracingSink {
    severity: Severity,
}

impl TracingSink {
    pub fn info() -> Self {
        Self {
            severity: Severity::Info,
        }
    }

    pub fn warn() -> Self {
        Self {
            severity: Severity::Warn,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl ReportSink for TracingSink {
    fn emit(&mut self, line: &str) -> Result<()> {
        match self.severity {
            Severity::Info => info!(target: "aq_reporter::sink", "{}", line),
            Severity::Warn => warn!(target: "aq_reporter::sink", "{}", line),
        }
        Ok(())
    }
}
