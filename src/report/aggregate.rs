use chrono::{DateTime, FixedOffset, Timelike};

use crate::reading::Reading;
use crate::report::types::{HourlyAverage, Report};
use crate::report::utility::mean;

pub const HOURS_PER_DAY: u32 = 24;

/// Hours of the report in output order: `current`, `current - 1`, … wrapping mod 24.
pub fn target_hours(current_hour: u32) -> impl Iterator<Item = u32> {
    (0..HOURS_PER_DAY).map(move |i| (current_hour + HOURS_PER_DAY - i) % HOURS_PER_DAY)
}

/// Builds the 24-bucket [`Report`] for `window` at `run_time`.
///
/// A reading falls into a bucket by its hour-of-day alone, in its own offset;
/// readings from different dates with the same hour are pooled together.
/// Each measure is averaged independently and an empty bucket yields
/// [`crate::report::types::Average::NoData`].
pub fn aggregate_hourly(window: &[Reading], run_time: DateTime<FixedOffset>) -> Report {
    let hours = target_hours(run_time.hour())
        .map(|hour| {
            let bucket = window.iter().filter(|r| r.timestamp.hour() == hour);

            let pm2_5: Vec<f64> = bucket.clone().map(|r| r.pm2_5).collect();
            let pm10: Vec<f64> = bucket.map(|r| r.pm10).collect();

            HourlyAverage {
                hour,
                avg_pm2_5: mean(&pm2_5),
                avg_pm10: mean(&pm10),
            }
        })
        .collect();

    Report { run_time, hours }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::parse_timestamp;
    use crate::report::types::Average;
    use std::collections::HashSet;

    fn reading(ts: &str, pm2_5: f64, pm10: f64) -> Reading {
        Reading::new(parse_timestamp(ts).unwrap(), pm2_5, pm10)
    }

    fn run_at(ts: &str) -> DateTime<FixedOffset> {
        parse_timestamp(ts).unwrap()
    }

    #[test]
    fn test_target_hours_wrap() {
        let hours: Vec<u32> = target_hours(1).take(4).collect();
        assert_eq!(hours, vec![1, 0, 23, 22]);
        assert_eq!(target_hours(16).count(), 24);
        assert_eq!(target_hours(0).last(), Some(1));
    }

    #[test]
    fn test_two_buckets_scenario() {
        let window = vec![
            reading("2025-01-01T15:00:00+00:00", 10.0, 20.0),
            reading("2025-01-01T15:30:00+00:00", 20.0, 30.0),
            reading("2025-01-01T16:00:00+00:00", 5.0, 5.0),
        ];
        let report = aggregate_hourly(&window, run_at("2025-01-01T16:00:00+00:00"));

        let h15 = report.get(15).unwrap();
        assert_eq!(h15.avg_pm2_5, Average::Numeric(15.0));
        assert_eq!(h15.avg_pm10, Average::Numeric(25.0));

        let h16 = report.get(16).unwrap();
        assert_eq!(h16.avg_pm2_5, Average::Numeric(5.0));
        assert_eq!(h16.avg_pm10, Average::Numeric(5.0));

        let empty = report
            .iter()
            .filter(|h| h.avg_pm2_5.is_no_data() && h.avg_pm10.is_no_data())
            .count();
        assert_eq!(empty, 22);
    }

    #[test]
    fn test_empty_window_is_all_no_data() {
        let report = aggregate_hourly(&[], run_at("2025-01-01T16:00:00+00:00"));

        assert_eq!(report.len(), 24);
        assert!(
            report
                .iter()
                .all(|h| h.avg_pm2_5 == Average::NoData && h.avg_pm10 == Average::NoData)
        );
    }

    #[test]
    fn test_report_covers_every_hour_once() {
        let window = vec![reading("2025-01-01T03:10:00+00:00", 1.0, 1.0)];
        let report = aggregate_hourly(&window, run_at("2025-01-01T07:45:00+00:00"));

        let hours: HashSet<u32> = report.iter().map(|h| h.hour).collect();
        assert_eq!(report.len(), 24);
        assert_eq!(hours.len(), 24);
        assert!(hours.iter().all(|h| *h < 24));
    }

    #[test]
    fn test_report_order_starts_at_current_hour() {
        let report = aggregate_hourly(&[], run_at("2025-01-02T02:00:00+00:00"));
        let order: Vec<u32> = report.iter().map(|h| h.hour).take(4).collect();
        assert_eq!(order, vec![2, 1, 0, 23]);
    }

    #[test]
    fn test_same_hour_on_different_days_is_pooled() {
        let window = vec![
            reading("2025-01-01T10:15:00+00:00", 2.0, 4.0),
            reading("2025-01-02T10:15:00+00:00", 4.0, 8.0),
        ];
        let report = aggregate_hourly(&window, run_at("2025-01-02T10:30:00+00:00"));

        let h10 = report.get(10).unwrap();
        assert_eq!(h10.avg_pm2_5, Average::Numeric(3.0));
        assert_eq!(h10.avg_pm10, Average::Numeric(6.0));
    }

    #[test]
    fn test_hour_taken_in_reading_offset() {
        // 10:00+02:00 belongs to bucket 10, not to 8 (its UTC hour).
        let window = vec![reading("2025-01-01T10:00:00+02:00", 9.0, 9.0)];
        let report = aggregate_hourly(&window, run_at("2025-01-01T10:00:00+00:00"));

        assert_eq!(report.get(10).unwrap().avg_pm2_5, Average::Numeric(9.0));
        assert!(report.get(8).unwrap().avg_pm2_5.is_no_data());
    }

    #[test]
    fn test_aggregation_is_bit_identical_on_rerun() {
        let window = vec![
            reading("2025-01-01T15:00:00+00:00", 0.1, 0.7),
            reading("2025-01-01T15:20:00+00:00", 0.2, 0.3),
            reading("2025-01-01T15:40:00+00:00", 0.3, 1.9),
        ];
        let run_time = run_at("2025-01-01T16:00:00+00:00");

        let first = aggregate_hourly(&window, run_time);
        let second = aggregate_hourly(&window, run_time);

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.hour, b.hour);
            assert_eq!(
                a.avg_pm2_5.value().map(f64::to_bits),
                b.avg_pm2_5.value().map(f64::to_bits)
            );
            assert_eq!(
                a.avg_pm10.value().map(f64::to_bits),
                b.avg_pm10.value().map(f64::to_bits)
            );
        }
    }

    #[test]
    fn test_mean_within_tolerance_regardless_of_order() {
        let forward = vec![
            reading("2025-01-01T15:00:00+00:00", 0.1, 1.0),
            reading("2025-01-01T15:10:00+00:00", 0.2, 2.0),
            reading("2025-01-01T15:20:00+00:00", 0.3, 3.0),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        let run_time = run_at("2025-01-01T15:30:00+00:00");

        let a = aggregate_hourly(&forward, run_time);
        let b = aggregate_hourly(&backward, run_time);

        let x = a.get(15).unwrap().avg_pm2_5.value().unwrap();
        let y = b.get(15).unwrap().avg_pm2_5.value().unwrap();
        assert!((x - y).abs() < 1e-12);
        assert!((x - 0.2).abs() < 1e-12);
    }
}
