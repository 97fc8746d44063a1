use serde::{Deserialize, Serialize};

use crate::reading::SensorReading;

/// The four-field envelope downstream consumers of the smaller shape expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bme280Telemetry {
    #[serde(rename = "TemperatureCelsius")]
    pub temperature_celsius: String,
    #[serde(rename = "PressureHectoPascals")]
    pub pressure_hecto_pascals: String,
    #[serde(rename = "RelativeHumidityPercent")]
    pub relative_humidity_percent: String,
    #[serde(rename = "EstimatedAltitudeMeters")]
    pub estimated_altitude_meters: String,
}

/// Extended envelope: the base fields flattened in place plus light and
/// proximity, so consumers of [`Bme280Telemetry`] can still parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnviroTelemetry {
    #[serde(flatten)]
    pub base: Bme280Telemetry,
    #[serde(rename = "Lux")]
    pub lux: String,
    #[serde(rename = "Proximity")]
    pub proximity: String,
}

impl From<&SensorReading> for EnviroTelemetry {
    fn from(reading: &SensorReading) -> Self {
        Self {
            base: Bme280Telemetry {
                temperature_celsius: reading.temperature.clone(),
                pressure_hecto_pascals: reading.pressure.clone(),
                relative_humidity_percent: reading.humidity.clone(),
                estimated_altitude_meters: reading.altitude.clone(),
            },
            lux: reading.light.clone(),
            proximity: reading.proximity.clone(),
        }
    }
}

/// JSON body with every non-ASCII character escaped as `\uXXXX`, so the degree
/// sign survives ASCII-only consumers.
pub fn to_ascii_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let text = serde_json::to_string(value)?;
    let mut body = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_ascii() {
            body.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                body.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }

    Ok(body.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> SensorReading {
        SensorReading {
            temperature: "21.3\u{00B0}C".into(),
            pressure: "998.45 hPa".into(),
            humidity: "45.2%".into(),
            altitude: "112 m".into(),
            light: "250.04".into(),
            proximity: "0".into(),
        }
    }

    #[test]
    fn extended_record_round_trips() {
        let record = EnviroTelemetry::from(&sample_reading());

        let body = serde_json::to_string(&record).unwrap();
        let parsed: EnviroTelemetry = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed, record);
    }

    #[test]
    fn extended_record_parses_as_base_shape() {
        let record = EnviroTelemetry::from(&sample_reading());

        let body = serde_json::to_string(&record).unwrap();
        let base: Bme280Telemetry = serde_json::from_str(&body).unwrap();

        assert_eq!(base, record.base);
    }

    #[test]
    fn json_uses_stable_field_names() {
        let record = EnviroTelemetry::from(&sample_reading());

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["TemperatureCelsius"], "21.3\u{00B0}C");
        assert_eq!(value["PressureHectoPascals"], "998.45 hPa");
        assert_eq!(value["RelativeHumidityPercent"], "45.2%");
        assert_eq!(value["EstimatedAltitudeMeters"], "112 m");
        assert_eq!(value["Lux"], "250.04");
        assert_eq!(value["Proximity"], "0");
    }

    #[test]
    fn ascii_body_escapes_degree_sign_and_round_trips() {
        let record = EnviroTelemetry::from(&sample_reading());

        let body = to_ascii_json(&record).unwrap();

        assert!(body.is_ascii());
        let parsed: EnviroTelemetry = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.base.temperature_celsius, "21.3\u{00B0}C");
    }
}
