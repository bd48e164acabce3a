//! # homelite-adapter-mqtt
//!
//! MQTT backend — bridges MQTT-addressable devices into homelite.
//!
//! MQTT devices are pre-registered, not discovered, so the backend's only
//! real capability is [`send_command`](homelite_app::ports::DeviceBackend::send_command):
//! it publishes `{"value": ...}` to `{base_topic}/{device_id}/{action}` at
//! QoS 1 and reports success only when the client accepted the publish.
//! Discover/connect/disconnect stay the no-op defaults.
//!
//! A spawned task drives the rumqttc event loop for the lifetime of the
//! process; connection errors are logged and retried, never fatal.
//!
//! ## Dependency rule
//!
//! Depends on `homelite-app` (port traits) and `homelite-domain` only.

mod config;

pub use config::MqttConfig;

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;

use homelite_app::ports::DeviceBackend;
use homelite_domain::device::{Device, DeviceCommand, DeviceType};

/// Backend publishing device commands to an MQTT broker.
pub struct MqttBackend {
    client: AsyncClient,
    base_topic: String,
}

impl MqttBackend {
    /// Build the client and spawn the event-loop task.
    ///
    /// The connection is established lazily by the event loop; publishing
    /// before the broker is reachable fails soft (logged, `false`).
    #[must_use]
    pub fn connect(config: &MqttConfig) -> (Self, JoinHandle<()>) {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, event_loop) = AsyncClient::new(options, 64);
        let handle = tokio::spawn(drive_event_loop(event_loop));

        tracing::info!(
            broker = %config.broker_host,
            port = config.broker_port,
            "MQTT backend started"
        );

        (
            Self {
                client,
                base_topic: config.base_topic.clone(),
            },
            handle,
        )
    }

    /// Disconnect gracefully. The event-loop task winds down on its own
    /// once the connection closes.
    pub async fn shutdown(&self) {
        if let Err(err) = self.client.disconnect().await {
            tracing::debug!(%err, "error disconnecting MQTT client");
        }
    }
}

/// Poll the rumqttc event loop forever, logging connection state.
async fn drive_event_loop(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::info!(code = ?ack.code, "MQTT connected");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "MQTT connection error, retrying");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

/// Topic a command for `device_id`/`action` is published to.
fn command_topic(base_topic: &str, device_id: &str, action: &str) -> String {
    format!("{base_topic}/{device_id}/{action}")
}

impl DeviceBackend for MqttBackend {
    fn kind(&self) -> DeviceType {
        DeviceType::Mqtt
    }

    async fn send_command(&self, device: &Device, command: &DeviceCommand) -> bool {
        let topic = command_topic(&self.base_topic, device.id.as_str(), &command.action);
        let payload = match serde_json::to_vec(&serde_json::json!({ "value": command.value })) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, id = %device.id, "failed to encode MQTT payload");
                return false;
            }
        };

        match self
            .client
            .publish(topic.as_str(), QoS::AtLeastOnce, false, payload)
            .await
        {
            Ok(()) => {
                tracing::debug!(%topic, "published device command");
                true
            }
            Err(err) => {
                tracing::warn!(%err, %topic, "MQTT publish failed");
                false
            }
        }
    }
}
