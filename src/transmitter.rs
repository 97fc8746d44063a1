use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, MqttOptions, QoS};

use crate::errors::{Error, TransmitError};
use crate::telemetry::{EnviroTelemetry, to_ascii_json};

const DEFAULT_PORT: u16 = 1883;
const MASKED_KEY: &str = "SharedAccessKey=*****************";

#[async_trait]
pub trait TelemetrySink {
    async fn send(&mut self, record: &EnviroTelemetry) -> Result<(), TransmitError>;
}

/// Pieces of a `Key=Value;` device connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub device_id: String,
    pub shared_access_key: String,
}

impl ConnectionTarget {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut host = None;
        let mut port = None;
        let mut device_id = None;
        let mut shared_access_key = None;

        for part in raw.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = part.trim().split_once('=').ok_or_else(|| {
                Error::Configuration(format!("malformed connection string segment `{part}`"))
            })?;

            match key {
                "HostName" => host = Some(value.to_string()),
                "Port" => {
                    let parsed = value.parse::<u16>().map_err(|_| {
                        Error::Configuration(format!("invalid port `{value}` in connection string"))
                    })?;
                    port = Some(parsed);
                }
                "DeviceId" => device_id = Some(value.to_string()),
                "SharedAccessKey" => shared_access_key = Some(value.to_string()),
                _ => {}
            }
        }

        let missing =
            |key: &str| Error::Configuration(format!("connection string is missing {key}"));

        Ok(Self {
            host: host.ok_or_else(|| missing("HostName"))?,
            port: port.unwrap_or(DEFAULT_PORT),
            device_id: device_id.ok_or_else(|| missing("DeviceId"))?,
            shared_access_key: shared_access_key.ok_or_else(|| missing("SharedAccessKey"))?,
        })
    }

    /// Connection string safe for logs, with the shared key blanked out.
    pub fn masked(raw: &str) -> String {
        match raw.find("SharedAccessKey") {
            Some(index) => format!("{}{}", &raw[..index], MASKED_KEY),
            None => raw.to_string(),
        }
    }
}

/// One persistent MQTT connection, established at run start and reused for
/// every cycle's publish.
pub struct MqttTransmitter {
    client: AsyncClient,
    topic: String,
}

impl MqttTransmitter {
    pub fn connect(connection_string: &str) -> Result<Self, Error> {
        let target = ConnectionTarget::parse(connection_string)?;

        let mut options = MqttOptions::new(&target.device_id, &target.host, target.port);
        options.set_keep_alive(Duration::from_secs(5));
        options.set_credentials(
            format!("{}/{}", target.host, target.device_id),
            &target.shared_access_key,
        );

        let (client, mut event_loop) = AsyncClient::new(options, 10);

        // The event loop has to keep polling for queued publishes to go out;
        // transport errors surface here rather than at the publish call.
        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("MQTT error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(Self {
            topic: format!("devices/{}/messages/events/", target.device_id),
            client,
        })
    }

    /// Handle for closing the connection once the run ends.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }
}

#[async_trait]
impl TelemetrySink for MqttTransmitter {
    async fn send(&mut self, record: &EnviroTelemetry) -> Result<(), TransmitError> {
        let body = to_ascii_json(record)?;

        self.client
            .publish(&self.topic, QoS::AtLeastOnce, false, body)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTION: &str = "HostName=hub.example.com;DeviceId=enviro-pi;SharedAccessKey=c2VjcmV0";

    #[test]
    fn parse_reads_all_segments() {
        let target =
            ConnectionTarget::parse("HostName=hub.example.com;Port=8883;DeviceId=enviro-pi;SharedAccessKey=c2VjcmV0")
                .unwrap();

        assert_eq!(target.host, "hub.example.com");
        assert_eq!(target.port, 8883);
        assert_eq!(target.device_id, "enviro-pi");
        assert_eq!(target.shared_access_key, "c2VjcmV0");
    }

    #[test]
    fn parse_defaults_the_port() {
        let target = ConnectionTarget::parse(CONNECTION).unwrap();

        assert_eq!(target.port, DEFAULT_PORT);
    }

    #[test]
    fn parse_requires_host_and_key() {
        assert!(matches!(
            ConnectionTarget::parse("DeviceId=enviro-pi;SharedAccessKey=c2VjcmV0"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ConnectionTarget::parse("HostName=hub.example.com;DeviceId=enviro-pi"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn parse_rejects_malformed_segments() {
        assert!(matches!(
            ConnectionTarget::parse("HostName"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn masked_never_reveals_the_key() {
        let masked = ConnectionTarget::masked(CONNECTION);

        assert!(!masked.contains("c2VjcmV0"));
        assert!(masked.starts_with("HostName=hub.example.com;DeviceId=enviro-pi;"));
        assert!(masked.ends_with(MASKED_KEY));
    }
}
