use std::time::Duration;

use bme280::Measurements;
use bme280::i2c::BME280;
use linux_embedded_hal::i2cdev::linux::LinuxI2CError;
use linux_embedded_hal::{Delay, I2cdev};

use crate::errors::SensorError;

/// Mean sea level pressure, Pa.
const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Worst-case BME280 conversion time at the driver's default oversampling.
const MEASUREMENT_DELAY: Duration = Duration::from_millis(10);

/// The driver collaborator the acquisition loop reads from. A forced measurement
/// is triggered explicitly, results are valid only after [`measurement_delay`]
/// has elapsed, and every scalar read may report absence of a value.
///
/// [`measurement_delay`]: EnvironmentSensor::measurement_delay
pub trait EnvironmentSensor {
    fn begin_forced_measurement(&mut self) -> Result<(), SensorError>;

    /// Settling time the sensor needs between trigger and read.
    fn measurement_delay(&self) -> Duration;

    fn temperature_celsius(&self) -> Option<f64>;

    fn pressure_hectopascals(&self) -> Option<f64>;

    fn relative_humidity_percent(&self) -> Option<f64>;

    fn altitude_meters(&self) -> Option<f64>;
}

/// BME280 on a Linux I2C bus at the secondary address, in forced single-shot
/// mode. Altitude is derived from pressure with the barometric formula.
pub struct Bme280Sensor {
    driver: BME280<I2cdev>,
    delay: Delay,
    last: Option<Measurements<LinuxI2CError>>,
}

impl Bme280Sensor {
    pub fn open(bus_path: &str) -> Result<Self, SensorError> {
        let i2c = I2cdev::new(bus_path).map_err(|e| SensorError::BusOpen {
            path: bus_path.to_string(),
            detail: e.to_string(),
        })?;

        let mut driver = BME280::new_secondary(i2c);
        let mut delay = Delay;
        driver
            .init(&mut delay)
            .map_err(|e| SensorError::Init(format!("{e:?}")))?;

        Ok(Self {
            driver,
            delay,
            last: None,
        })
    }

    fn pressure_pascals(&self) -> Option<f64> {
        self.last.as_ref().map(|m| f64::from(m.pressure))
    }
}

impl EnvironmentSensor for Bme280Sensor {
    fn begin_forced_measurement(&mut self) -> Result<(), SensorError> {
        // The driver runs the forced-mode conversion itself; the result is
        // cached here and handed out by the read accessors.
        let measurements = self
            .driver
            .measure(&mut self.delay)
            .map_err(|e| SensorError::Measurement(format!("{e:?}")))?;

        self.last = Some(measurements);

        Ok(())
    }

    fn measurement_delay(&self) -> Duration {
        MEASUREMENT_DELAY
    }

    fn temperature_celsius(&self) -> Option<f64> {
        self.last.as_ref().map(|m| f64::from(m.temperature))
    }

    fn pressure_hectopascals(&self) -> Option<f64> {
        self.pressure_pascals().map(|p| p / 100.0)
    }

    fn relative_humidity_percent(&self) -> Option<f64> {
        self.last.as_ref().map(|m| f64::from(m.humidity))
    }

    fn altitude_meters(&self) -> Option<f64> {
        self.pressure_pascals()
            .map(|p| 44_330.0 * (1.0 - (p / SEA_LEVEL_PRESSURE_PA).powf(1.0 / 5.255)))
    }
}
