use std::io;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("failed to open sensor bus {path}: {detail}")]
    BusOpen { path: String, detail: String },

    #[error("sensor initialization failed: {0}")]
    Init(String),

    #[error("sensor measurement failed: {0}")]
    Measurement(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("failed to launch `{command} {script}`: {source}")]
    Launch {
        command: String,
        script: String,
        #[source]
        source: io::Error,
    },

    #[error("sampler output is not valid UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("expected at least 8 quote-delimited tokens, got {0}")]
    MalformedOutput(usize),

    #[error("sampler did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum TransmitError {
    #[error("failed to serialize telemetry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to publish telemetry: {0}")]
    Publish(#[from] rumqttc::ClientError),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Transmit(#[from] TransmitError),
}
