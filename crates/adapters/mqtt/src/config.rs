//! MQTT backend configuration.

use serde::Deserialize;

/// Configuration for the MQTT backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Whether the MQTT backend is wired up at all.
    pub enabled: bool,
    /// Broker hostname or IP address.
    pub broker_host: String,
    /// Broker port.
    pub broker_port: u16,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Base topic prefix for all homelite MQTT traffic.
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Optional broker credentials.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "homelite".to_string(),
            base_topic: "homelite".to_string(),
            keep_alive_secs: 30,
            username: None,
            password: None,
        }
    }
}
