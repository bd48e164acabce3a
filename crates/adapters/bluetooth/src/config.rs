//! Bluetooth backend configuration.

use serde::Deserialize;

/// Which scanning/connection strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// Probe for a native adapter, fall back to `bluetoothctl`.
    #[default]
    Auto,
    /// Require native (btleplug) scanning; fail startup if unavailable.
    Native,
    /// Always shell out to `bluetoothctl`.
    Cli,
}

/// Configuration for the Bluetooth backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// Strategy selection, resolved once at startup.
    pub strategy: StrategyChoice,
    /// Native scan window in seconds.
    pub native_scan_secs: u16,
    /// `bluetoothctl scan on` window in seconds.
    pub cli_scan_secs: u16,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyChoice::Auto,
            native_scan_secs: 10,
            cli_scan_secs: 5,
        }
    }
}
