//! Persistence for ingested readings and report snapshots.
//!
//! Supports CSV append for the readings file and JSON for reports.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::report::Report;
use csv::WriterBuilder;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Appends a record as a row to a CSV file.
///
/// Creates the file (and its parent directory) if needed. Headers are written
/// when the file is missing or empty.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    debug!(path = %path.display(), needs_header, "Appending CSV record");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(needs_header) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Writes a report as pretty-printed JSON, replacing any previous file.
pub fn write_report_json(path: &Path, report: &Report) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Report JSON written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::parse_timestamp;
    use crate::report::aggregate_hourly;
    use std::env;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Row {
        sensor_id: u32,
        pm2_5: f64,
        pm10: f64,
        timestamp: String,
    }

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn row() -> Row {
        Row {
            sensor_id: 1,
            pm2_5: 12.5,
            pm10: 40.0,
            timestamp: "2025-01-01T13:01:00+0000".to_string(),
        }
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("aq_reporter_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_record(&path, &row()).unwrap();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("sensor_id,pm2_5,pm10,timestamp\n"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("aq_reporter_test_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &row()).unwrap();
        append_record(&path, &row()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_to_empty_file_writes_header() {
        let path = temp_path("aq_reporter_test_empty.csv");
        fs::write(&path, "").unwrap();

        append_record(&path, &row()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("sensor_id,pm2_5,pm10,timestamp\n"));
        assert_eq!(content.lines().count(), 2);

        let readings = crate::reading::load_readings(&path).unwrap().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].pm2_5, 12.5);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_report_json() {
        let path = temp_path("aq_reporter_test_report.json");
        let report = aggregate_hourly(&[], parse_timestamp("2025-01-01T05:00:00+00:00").unwrap());

        write_report_json(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let hours = value["hours"].as_array().unwrap();
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[0]["hour"], 5);
        assert_eq!(hours[0]["avg_pm2_5"], "NO DATA");

        fs::remove_file(&path).unwrap();
    }
}
