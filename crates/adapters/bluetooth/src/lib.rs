//! # homelite-adapter-bluetooth
//!
//! Bluetooth backend with two mutually exclusive strategies, resolved once
//! at startup and never re-probed per call:
//!
//! - **native** — btleplug scanning against the host's Bluetooth stack,
//!   with a fixed 10 s scan window;
//! - **cli** — shelling out to `bluetoothctl` (5 s scan window, device list
//!   parsed from its text output). Link success on this strategy is
//!   determined by the word `successful` appearing in captured stdout.
//!
//! Discovered entries are normalized to a device whose id is the
//! lower-cased, separator-stripped address, with `status = "online"`.
//! Link-level failures degrade to a logged `false`; only startup probing
//! and discovery sweeps surface errors.
//!
//! ## Dependency rule
//!
//! Depends on `homelite-app` (port traits) and `homelite-domain` only.

mod cli;
mod config;
mod error;
mod native;

pub use config::{BluetoothConfig, StrategyChoice};
pub use error::BluetoothError;

use std::time::Duration;

use homelite_app::ports::DeviceBackend;
use homelite_domain::device::{Device, DeviceCommand, DeviceType, status};
use homelite_domain::error::HubError;
use homelite_domain::id::DeviceId;
use homelite_domain::property::Properties;

use cli::CliStrategy;
use native::NativeStrategy;

enum Strategy {
    Native(NativeStrategy),
    Cli(CliStrategy),
}

/// Bluetooth backend over the strategy resolved at startup.
pub struct BluetoothBackend {
    strategy: Strategy,
}

impl BluetoothBackend {
    /// Resolve the scanning strategy per the configuration and build the
    /// backend. `auto` probes for a native adapter and falls back to the
    /// `bluetoothctl` CLI when none is usable.
    ///
    /// # Errors
    ///
    /// Returns [`BluetoothError::NotAvailable`] (or the probe failure) only
    /// when the configuration *requires* the native strategy.
    pub async fn init(config: &BluetoothConfig) -> Result<Self, BluetoothError> {
        let native_window = Duration::from_secs(u64::from(config.native_scan_secs));
        let cli_window = Duration::from_secs(u64::from(config.cli_scan_secs));

        let strategy = match config.strategy {
            StrategyChoice::Native => Strategy::Native(NativeStrategy::probe(native_window).await?),
            StrategyChoice::Cli => Strategy::Cli(CliStrategy::new(cli_window)),
            StrategyChoice::Auto => match NativeStrategy::probe(native_window).await {
                Ok(native) => Strategy::Native(native),
                Err(err) => {
                    tracing::warn!(%err, "native Bluetooth unavailable, falling back to bluetoothctl");
                    Strategy::Cli(CliStrategy::new(cli_window))
                }
            },
        };

        tracing::info!(strategy = strategy_name(&strategy), "Bluetooth backend ready");
        Ok(Self { strategy })
    }

    /// Which strategy was resolved at init (`"native"` or `"cli"`).
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        strategy_name(&self.strategy)
    }

    async fn link_call(&self, device: &Device, connect: bool) -> bool {
        let Some(address) = device.address.as_deref() else {
            tracing::warn!(id = %device.id, "Bluetooth device has no address");
            return false;
        };

        let result = match (&self.strategy, connect) {
            (Strategy::Native(native), true) => native.connect(address).await,
            (Strategy::Native(native), false) => native.disconnect(address).await,
            (Strategy::Cli(cli), true) => cli.connect(address).await,
            (Strategy::Cli(cli), false) => cli.disconnect(address).await,
        };

        match result {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(%err, id = %device.id, "Bluetooth link call failed");
                false
            }
        }
    }
}

fn strategy_name(strategy: &Strategy) -> &'static str {
    match strategy {
        Strategy::Native(_) => "native",
        Strategy::Cli(_) => "cli",
    }
}

impl DeviceBackend for BluetoothBackend {
    fn kind(&self) -> DeviceType {
        DeviceType::Bluetooth
    }

    async fn discover(&self) -> Result<Vec<Device>, HubError> {
        let result = match &self.strategy {
            Strategy::Native(native) => native.scan().await,
            Strategy::Cli(cli) => cli.scan().await,
        };
        result.map_err(Into::into)
    }

    async fn connect(&self, device: &Device) -> bool {
        self.link_call(device, true).await
    }

    async fn disconnect(&self, device: &Device) -> bool {
        self.link_call(device, false).await
    }

    async fn send_command(&self, device: &Device, command: &DeviceCommand) -> bool {
        // Per-model command vocabularies are out of scope: pass-through is
        // best-effort and reported as accepted.
        tracing::info!(
            id = %device.id,
            action = %command.action,
            "passing command through to Bluetooth device"
        );
        true
    }
}

/// Normalize one discovered entry into a device record.
///
/// The id is derived from the address so repeated discoveries of the same
/// radio collapse onto one record; a missing advertised name falls back to
/// `"Unknown Device (<addr>)"`.
pub(crate) fn discovered(address: &str, name: Option<&str>, properties: Properties) -> Device {
    let name = match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("Unknown Device ({address})"),
    };

    Device {
        id: DeviceId::from_address(address),
        name,
        kind: DeviceType::Bluetooth,
        address: Some(address.to_string()),
        status: status::ONLINE.to_string(),
        properties,
        last_seen: None,
        actions: Vec::new(),
    }
}
