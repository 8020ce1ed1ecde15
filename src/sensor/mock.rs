use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{error, info};

use super::{SensorPayload, SensorReader};
use crate::error::SensorError;

/// Fine particle range in µg/m³.
const PM2_5_RANGE: std::ops::Range<f64> = 5.0..100.0;
/// Coarse particle range in µg/m³.
const PM10_RANGE: std::ops::Range<f64> = 10.0..150.0;

pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Stand-in for a physical sensor: random values, occasional failures.
///
/// With a simulated delay configured, every read logs a failure, blocks for
/// the delay and then reports the sensor as unavailable.
pub struct MockSensor<R = StdRng> {
    rng: R,
    failure_rate: f64,
    simulated_delay: Option<Duration>,
}

impl MockSensor<StdRng> {
    pub fn new(failure_rate: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), failure_rate)
    }
}

impl<R: Rng> MockSensor<R> {
    pub fn with_rng(rng: R, failure_rate: f64) -> Self {
        Self {
            rng,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            simulated_delay: None,
        }
    }

    pub fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = Some(delay);
        self
    }
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl<R: Rng> SensorReader for MockSensor<R> {
    fn read(&mut self, sensor_id: u32, timestamp: &str) -> Result<SensorPayload, SensorError> {
        if let Some(delay) = self.simulated_delay {
            error!(sensor_id, "Failed to get data from sensor");
            info!(retry_in_secs = delay.as_secs(), "Retrying later");
            std::thread::sleep(delay);
            return Err(SensorError::Unavailable(sensor_id));
        }

        if self.rng.r#gen::<f64>() < self.failure_rate {
            error!(sensor_id, "Failed to get data from sensor");
            return Err(SensorError::Status {
                sensor_id,
                status: 500,
            });
        }

        info!(sensor_id, "Getting data from sensor");

        Ok(SensorPayload {
            sensor_id,
            pm2_5: round_one_decimal(self.rng.gen_range(PM2_5_RANGE)),
            pm10: round_one_decimal(self.rng.gen_range(PM10_RANGE)),
            timestamp: timestamp.to_string(),
        })
    }
}
