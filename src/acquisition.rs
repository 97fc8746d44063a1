use tokio::time;

use crate::errors::Error;
use crate::reading::{self, SensorReading};
use crate::sampler::LightProximitySource;
use crate::sensor::EnvironmentSensor;

/// One polling cycle: trigger a forced measurement, wait out the settling
/// time, read the four scalars, sample light/proximity, assemble the reading.
pub struct Acquisition<S, L> {
    sensor: S,
    sampler: L,
    show_telemetry: bool,
}

impl<S, L> Acquisition<S, L>
where
    S: EnvironmentSensor,
    L: LightProximitySource,
{
    pub fn new(sensor: S, sampler: L, show_telemetry: bool) -> Self {
        Self {
            sensor,
            sampler,
            show_telemetry,
        }
    }

    pub async fn run_cycle(&mut self) -> Result<SensorReading, Error> {
        self.sensor.begin_forced_measurement()?;
        time::sleep(self.sensor.measurement_delay()).await;

        let temperature = scalar_or_warn(self.sensor.temperature_celsius(), "temperature");
        let pressure = scalar_or_warn(self.sensor.pressure_hectopascals(), "pressure");
        let humidity = scalar_or_warn(self.sensor.relative_humidity_percent(), "humidity");
        let altitude = scalar_or_warn(self.sensor.altitude_meters(), "altitude");

        let sample = self.sampler.sample().await?;

        let sensor_reading = SensorReading {
            temperature: reading::format_temperature(temperature),
            pressure: reading::format_pressure(pressure),
            humidity: reading::format_humidity(humidity),
            altitude: reading::format_altitude(altitude),
            light: sample.light,
            proximity: sample.proximity,
        };

        if self.show_telemetry {
            tracing::info!("telemetry data:\n{}", sensor_reading);
        }

        Ok(sensor_reading)
    }
}

fn scalar_or_warn(value: Option<f64>, name: &str) -> Option<f64> {
    if value.is_none() {
        tracing::warn!("sensor reported no {} value", name);
    }

    value
}
