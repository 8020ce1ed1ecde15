//! CLI entry point for the air-quality jobs.
//!
//! Each subcommand is one scheduled run: `ingest` appends a sensor sample to
//! the readings file, `report` emits the hourly averages of the last day, and
//! `alert` checks the last 20 minutes against the alert thresholds. The exit
//! status tells the scheduler whether the run succeeded (0), was skipped (99)
//! or failed (1).

use anyhow::Result;
use aq_reporter::config::{self, Settings};
use aq_reporter::jobs::alert::{AlertParams, Thresholds, run_alert};
use aq_reporter::jobs::ingest::{IngestParams, run_ingest};
use aq_reporter::jobs::report::{ReportParams, run_report};
use aq_reporter::jobs::RunOutcome;
use aq_reporter::notify::{DatasetNotifier, JsonlNotifier, TracingNotifier};
use aq_reporter::reading::parse_timestamp;
use aq_reporter::sensor::{DEFAULT_FAILURE_RATE, MockSensor};
use aq_reporter::sink::TracingSink;
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aq_reporter")]
#[command(about = "Air-quality ingest, hourly report and alert jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Readings CSV (overrides AQ_DATA_PATH)
    #[arg(short, long, value_name = "CSV")]
    data: Option<PathBuf>,

    /// Scheduler timestamp for this run, with offset (defaults to now, UTC)
    #[arg(long, value_name = "TIMESTAMP", value_parser = parse_run_time)]
    ts: Option<DateTime<FixedOffset>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit the average PM2.5 and PM10 per hour over the last day
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// Block for AQ_FETCH_DELAY_SECS before reading the data
        #[arg(long, default_value_t = false)]
        delay_fetch: bool,

        /// Also write the report as JSON to this file
        #[arg(long, value_name = "FILE")]
        json_out: Option<PathBuf>,
    },
    /// Alert when the last 20 minutes exceed the PM thresholds
    Alert {
        #[command(flatten)]
        run: RunArgs,

        /// Block for AQ_FETCH_DELAY_SECS before reading the data
        #[arg(long, default_value_t = false)]
        delay_fetch: bool,

        /// Average PM2.5 (µg/m³) above which an alert is raised
        #[arg(long, default_value_t = 50.0)]
        pm2_5_threshold: f64,

        /// Average PM10 (µg/m³) above which an alert is raised
        #[arg(long, default_value_t = 100.0)]
        pm10_threshold: f64,
    },
    /// Read one sample from the sensor and append it to the readings CSV
    Ingest {
        #[command(flatten)]
        run: RunArgs,

        /// The id of the sensor to read
        #[arg(long, default_value_t = 1)]
        sensor_id: u32,

        /// Make the sensor hang for AQ_SENSOR_RETRY_SECS and then fail
        #[arg(long, default_value_t = false)]
        simulate_api_delay: bool,

        /// Probability that a sensor read fails
        #[arg(long, default_value_t = DEFAULT_FAILURE_RATE)]
        failure_rate: f64,
    },
}

fn parse_run_time(s: &str) -> Result<DateTime<FixedOffset>, String> {
    parse_timestamp(s).map_err(|e| format!("expected a timestamp with offset: {e}"))
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();
    let cli = Cli::parse();

    match execute(cli) {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::Success { emitted } => info!(emitted, "Run succeeded"),
                RunOutcome::Skipped { reason } => info!(reason = %reason, "Run skipped"),
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Run failed");
            ExitCode::FAILURE
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aq_reporter.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aq_reporter.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

fn execute(cli: Cli) -> Result<RunOutcome> {
    let settings = config::load_from_env()?;
    settings.log_config();

    let mut notifier = dataset_notifier(&settings);

    match cli.command {
        Commands::Report {
            run,
            delay_fetch,
            json_out,
        } => {
            let params = ReportParams {
                data_path: data_path(&run, &settings),
                run_time: run_time(&run),
                fetch_delay: delay_fetch.then_some(settings.fetch_delay),
                json_out,
            };
            run_report(&params, &mut TracingSink::info(), notifier.as_mut())
        }
        Commands::Alert {
            run,
            delay_fetch,
            pm2_5_threshold,
            pm10_threshold,
        } => {
            let params = AlertParams {
                data_path: data_path(&run, &settings),
                run_time: run_time(&run),
                fetch_delay: delay_fetch.then_some(settings.fetch_delay),
                thresholds: Thresholds {
                    pm2_5: pm2_5_threshold,
                    pm10: pm10_threshold,
                },
            };
            run_alert(
                &params,
                &mut TracingSink::warn(),
                &mut TracingSink::info(),
                notifier.as_mut(),
            )
        }
        Commands::Ingest {
            run,
            sensor_id,
            simulate_api_delay,
            failure_rate,
        } => {
            let params = IngestParams {
                data_path: data_path(&run, &settings),
                run_time: run_time(&run),
                sensor_id,
            };
            let mut sensor = MockSensor::new(failure_rate);
            if simulate_api_delay {
                sensor = sensor.with_simulated_delay(settings.sensor_retry);
            }
            run_ingest(&params, &mut sensor, notifier.as_mut())
        }
    }
}

fn dataset_notifier(settings: &Settings) -> Box<dyn DatasetNotifier> {
    match &settings.dataset_events {
        Some(path) => Box::new(JsonlNotifier::new(path)),
        None => Box::new(TracingNotifier),
    }
}

fn data_path(run: &RunArgs, settings: &Settings) -> PathBuf {
    run.data.clone().unwrap_or_else(|| settings.data_path.clone())
}

fn run_time(run: &RunArgs) -> DateTime<FixedOffset> {
    run.ts.unwrap_or_else(|| Utc::now().fixed_offset())
}
