//! Air-quality sensor access.

mod mock;

pub use mock::{DEFAULT_FAILURE_RATE, MockSensor};

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Raw response from a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    pub sensor_id: u32,
    pub pm2_5: f64,
    pub pm10: f64,
    pub timestamp: String,
}

pub trait SensorReader {
    /// Reads one PM2.5 / PM10 sample from `sensor_id`, stamped with `timestamp`.
    fn read(&mut self, sensor_id: u32, timestamp: &str) -> Result<SensorPayload, SensorError>;
}
