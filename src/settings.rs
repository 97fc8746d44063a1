use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub device: Device,
    pub sensor: Sensor,
    pub sampler: Sampler,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    /// Echo a human-readable dump of each reading before it is sent.
    pub output_telemetry: bool,
    pub connection_string: String,
    /// Session length; values at or below 15 fall back to the 15 second floor.
    pub read_duration_seconds: u64,
    /// Keep polling after a failed cycle instead of aborting the run.
    #[serde(default)]
    pub continue_after_cycle_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sensor {
    pub bus_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sampler {
    pub command: String,
    pub script: String,
    pub timeout_seconds: Option<u64>,
}

impl Settings {
    /// Environment variables win over the file sources.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let builder = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{}", run_mode)).required(false))
            .add_source(Environment::default().separator("__"));

        builder.build()?.try_deserialize()
    }
}
