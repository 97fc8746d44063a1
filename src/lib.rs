use std::time::Duration;

use crate::acquisition::Acquisition;
use crate::controller::RunController;
use crate::errors::Error;
use crate::sampler::ScriptSampler;
use crate::sensor::Bme280Sensor;
use crate::settings::Settings;
use crate::transmitter::{ConnectionTarget, MqttTransmitter};

pub mod acquisition;
pub mod controller;
pub mod errors;
pub mod reading;
pub mod sampler;
pub mod sensor;
pub mod settings;
pub mod telemetry;
pub mod transmitter;

pub async fn run(settings: &Settings) -> Result<(), Error> {
    tracing::info!("show telemetry: {}", settings.device.output_telemetry);
    tracing::info!(
        "connection string: {}",
        ConnectionTarget::masked(&settings.device.connection_string)
    );
    tracing::info!(
        "telemetry read duration set to: {} seconds",
        settings.device.read_duration_seconds
    );

    let transmitter = MqttTransmitter::connect(&settings.device.connection_string)?;
    let client = transmitter.client();

    let sensor = Bme280Sensor::open(&settings.sensor.bus_path)?;
    let sampler = ScriptSampler::new(
        &settings.sampler.command,
        &settings.sampler.script,
        settings.sampler.timeout_seconds.map(Duration::from_secs),
    );

    let acquisition = Acquisition::new(sensor, sampler, settings.device.output_telemetry);
    let mut controller = RunController::new(
        acquisition,
        transmitter,
        settings.device.read_duration_seconds,
        settings.device.continue_after_cycle_error,
    );

    let result = controller.run().await;

    // Close the connection on every exit path, failed runs included.
    if let Err(e) = client.disconnect().await {
        tracing::debug!("MQTT disconnect: {}", e);
    }

    result
}
