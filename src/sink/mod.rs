//! Destinations for emitted report and alert lines.
//!
//! [`ReportSink`] is the single "emit a line" capability the jobs depend on.
//! [`TracingSink`] forwards to the process log, [`MemorySink`] keeps the
//! lines in memory.

mod logger;
mod memory;

pub use logger::{Severity, TracingSink};
pub use memory::MemorySink;

use anyhow::Result;

pub trait ReportSink {
    fn emit(&mut self, line: &str) -> Result<()>;
}
