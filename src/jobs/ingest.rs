//! Sensor-to-CSV ingest: extract one sample, flatten it, append it.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use super::RunOutcome;
use crate::notify::{AQ_DATA, DatasetEvent, DatasetNotifier};
use crate::output::append_record;
use crate::reading::TIMESTAMP_FORMAT;
use crate::sensor::{SensorPayload, SensorReader};

pub const PRODUCER: &str = "aq_etl";

/// One row of the readings file as written by the ingest job.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub sensor_id: u32,
    pub pm2_5: f64,
    pub pm10: f64,
    pub timestamp: String,
}

impl From<SensorPayload> for ReadingRecord {
    fn from(p: SensorPayload) -> Self {
        ReadingRecord {
            sensor_id: p.sensor_id,
            pm2_5: p.pm2_5,
            pm10: p.pm10,
            timestamp: p.timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestParams {
    pub data_path: PathBuf,
    pub run_time: DateTime<FixedOffset>,
    pub sensor_id: u32,
}

/// The run timestamp marks the start of the previous one-minute interval;
/// the sample belongs to the minute after it.
pub fn sample_timestamp(run_time: DateTime<FixedOffset>) -> String {
    (run_time + Duration::minutes(1))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[tracing::instrument(skip_all, fields(run_time = %params.run_time, sensor_id = params.sensor_id))]
pub fn run_ingest<R, N>(params: &IngestParams, sensor: &mut R, notifier: &mut N) -> Result<RunOutcome>
where
    R: SensorReader + ?Sized,
    N: DatasetNotifier + ?Sized,
{
    let timestamp = sample_timestamp(params.run_time);
    let payload = sensor.read(params.sensor_id, &timestamp)?;

    let record = ReadingRecord::from(payload);
    append_record(&params.data_path, &record)
        .with_context(|| format!("failed to append to {}", params.data_path.display()))?;
    info!(pm2_5 = record.pm2_5, pm10 = record.pm10, "Reading stored");

    notifier.notify(&DatasetEvent::new(AQ_DATA, PRODUCER, params.run_time))?;

    Ok(RunOutcome::Success { emitted: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::notify::MemoryNotifier;
    use crate::reading::{load_readings, parse_timestamp};
    use std::env;
    use std::fs;

    struct FixedSensor;

    impl SensorReader for FixedSensor {
        fn read(&mut self, sensor_id: u32, timestamp: &str) -> Result<SensorPayload, SensorError> {
            Ok(SensorPayload {
                sensor_id,
                pm2_5: 12.3,
                pm10: 45.6,
                timestamp: timestamp.to_string(),
            })
        }
    }

    struct BrokenSensor;

    impl SensorReader for BrokenSensor {
        fn read(&mut self, sensor_id: u32, _timestamp: &str) -> Result<SensorPayload, SensorError> {
            Err(SensorError::Status {
                sensor_id,
                status: 500,
            })
        }
    }

    fn params(name: &str) -> IngestParams {
        IngestParams {
            data_path: env::temp_dir().join(name),
            run_time: parse_timestamp("2025-01-01T13:00:00+00:00").unwrap(),
            sensor_id: 1,
        }
    }

    #[test]
    fn test_sample_timestamp_is_one_minute_later() {
        let run_time = parse_timestamp("2025-01-01T13:59:00+00:00").unwrap();
        assert_eq!(sample_timestamp(run_time), "2025-01-01T14:00:00+0000");
    }

    #[test]
    fn test_ingest_appends_readable_rows() {
        let params = params("aq_reporter_test_ingest.csv");
        let _ = fs::remove_file(&params.data_path);

        let mut notifier = MemoryNotifier::default();
        run_ingest(&params, &mut FixedSensor, &mut notifier).unwrap();
        run_ingest(&params, &mut FixedSensor, &mut notifier).unwrap();

        let content = fs::read_to_string(&params.data_path).unwrap();
        assert!(content.starts_with("sensor_id,pm2_5,pm10,timestamp\n"));

        let readings = load_readings(&params.data_path).unwrap().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].pm2_5, 12.3);
        assert_eq!(
            readings[0].timestamp,
            parse_timestamp("2025-01-01T13:01:00+00:00").unwrap()
        );
        assert_eq!(notifier.events.len(), 2);
        assert_eq!(notifier.events[0].dataset, AQ_DATA);

        fs::remove_file(&params.data_path).unwrap();
    }

    #[test]
    fn test_ingest_into_empty_file_keeps_readings() {
        let params = params("aq_reporter_test_ingest_empty.csv");
        fs::write(&params.data_path, "").unwrap();

        let mut notifier = MemoryNotifier::default();
        run_ingest(&params, &mut FixedSensor, &mut notifier).unwrap();
        run_ingest(&params, &mut FixedSensor, &mut notifier).unwrap();

        let readings = load_readings(&params.data_path).unwrap().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].pm10, 45.6);

        fs::remove_file(&params.data_path).unwrap();
    }

    #[test]
    fn test_sensor_failure_writes_nothing() {
        let params = params("aq_reporter_test_ingest_fail.csv");
        let _ = fs::remove_file(&params.data_path);

        let mut notifier = MemoryNotifier::default();
        assert!(run_ingest(&params, &mut BrokenSensor, &mut notifier).is_err());
        assert!(!params.data_path.exists());
        assert!(notifier.events.is_empty());
    }
}
