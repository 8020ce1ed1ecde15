//! Runtime configuration loaded from environment variables.
//!
//! `.env` loading is done by the caller (`dotenvy`); this module only reads
//! the process environment and applies defaults.

use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_PATH: &str = "include/aq_data.csv";
/// 61 minutes: long enough to overlap the next hourly run.
pub const DEFAULT_FETCH_DELAY_SECS: u64 = 61 * 60;
pub const DEFAULT_SENSOR_RETRY_SECS: u64 = 5 * 60;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Readings CSV shared by all jobs.
    pub data_path: PathBuf,

    /// Artificial pre-fetch delay applied when a job is run with `--delay-fetch`.
    pub fetch_delay: Duration,

    /// How long the mock sensor blocks when an API delay is simulated.
    pub sensor_retry: Duration,

    /// Optional JSON-lines file receiving dataset events.
    pub dataset_events: Option<PathBuf>,
}

/// Load settings from the environment.
///
/// Optional:
/// - `AQ_DATA_PATH` – readings CSV (default: `include/aq_data.csv`)
/// - `AQ_FETCH_DELAY_SECS` – pre-fetch delay (default: 3660)
/// - `AQ_SENSOR_RETRY_SECS` – simulated sensor hang (default: 300)
/// - `AQ_DATASET_EVENTS` – dataset events file (default: unset, log only)
pub fn load_from_env() -> Result<Settings> {
    let data_path = env::var("AQ_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));
    let fetch_delay = parse_env_u64!("AQ_FETCH_DELAY_SECS", DEFAULT_FETCH_DELAY_SECS);
    let sensor_retry = parse_env_u64!("AQ_SENSOR_RETRY_SECS", DEFAULT_SENSOR_RETRY_SECS);
    let dataset_events = env::var("AQ_DATASET_EVENTS")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    Ok(Settings {
        data_path,
        fetch_delay: Duration::from_secs(fetch_delay),
        sensor_retry: Duration::from_secs(sensor_retry),
        dataset_events,
    })
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            fetch_delay: Duration::from_secs(DEFAULT_FETCH_DELAY_SECS),
            sensor_retry: Duration::from_secs(DEFAULT_SENSOR_RETRY_SECS),
            dataset_events: None,
        }
    }
}

impl Settings {
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  AQ_DATA_PATH         : {}", self.data_path.display());
        tracing::info!("  AQ_FETCH_DELAY_SECS  : {}", self.fetch_delay.as_secs());
        tracing::info!("  AQ_SENSOR_RETRY_SECS : {}", self.sensor_retry.as_secs());
        tracing::info!(
            "  AQ_DATASET_EVENTS    : {}",
            self.dataset_events
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(log only)".to_string())
        );
    }
}
