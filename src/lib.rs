pub mod config;
pub mod error;
pub mod jobs;
pub mod notify;
pub mod output;
pub mod reading;
pub mod report;
pub mod sensor;
pub mod sink;
