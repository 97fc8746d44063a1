use std::fmt;

/// One polling cycle's measurements, already rendered as display strings with
/// their unit suffixes. Created fresh each cycle and discarded after transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorReading {
    pub temperature: String,
    pub pressure: String,
    pub humidity: String,
    pub altitude: String,
    pub light: String,
    pub proximity: String,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Temperature: {}", self.temperature)?;
        writeln!(f, "Pressure: {}", self.pressure)?;
        writeln!(f, "Relative humidity: {}", self.humidity)?;
        writeln!(f, "Estimated altitude: {}", self.altitude)?;
        writeln!(f, "Light: {} lux", self.light)?;
        writeln!(f, "Proximity: {}", self.proximity)
    }
}

/// A scalar the driver reported no value for renders as an empty string; the
/// cycle carries on rather than aborting.
pub fn format_temperature(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}\u{00B0}C"))
        .unwrap_or_default()
}

pub fn format_pressure(value: Option<f64>) -> String {
    value
        .map(|v| format!("{} hPa", trimmed_two_decimals(v)))
        .unwrap_or_default()
}

pub fn format_humidity(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}%", trimmed_two_decimals(v)))
        .unwrap_or_default()
}

pub fn format_altitude(value: Option<f64>) -> String {
    value
        .map(|v| format!("{} m", v.round() as i64))
        .unwrap_or_default()
}

/// At most two decimal digits, trailing zeros dropped.
fn trimmed_two_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
