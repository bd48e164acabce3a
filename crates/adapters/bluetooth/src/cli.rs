//! Fallback strategy shelling out to `bluetoothctl`.
//!
//! Discovery runs `bluetoothctl scan on` for a fixed window to prime the
//! controller's device cache, kills it, then parses `bluetoothctl devices`
//! output line-wise against the fixed `Device <MAC> <name>` shape.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use homelite_domain::device::Device;
use homelite_domain::property::{Properties, PropertyValue};

use crate::error::BluetoothError;

pub(crate) struct CliStrategy {
    scan_window: Duration,
}

impl CliStrategy {
    pub(crate) fn new(scan_window: Duration) -> Self {
        Self { scan_window }
    }

    /// Prime the controller cache with a bounded scan, then list devices.
    pub(crate) async fn scan(&self) -> Result<Vec<Device>, BluetoothError> {
        let mut scan = Command::new("bluetoothctl")
            .args(["scan", "on"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(BluetoothError::CommandIo)?;

        tokio::time::sleep(self.scan_window).await;

        if let Err(err) = scan.kill().await {
            tracing::debug!(%err, "failed to kill bluetoothctl scan");
        }

        let output = Command::new("bluetoothctl")
            .arg("devices")
            .output()
            .await
            .map_err(BluetoothError::CommandIo)?;

        if !output.status.success() {
            tracing::warn!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "bluetoothctl devices failed"
            );
            return Ok(Vec::new());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let devices = parse_device_list(&stdout);
        tracing::info!(count = devices.len(), "bluetoothctl scan complete");
        Ok(devices)
    }

    pub(crate) async fn connect(&self, address: &str) -> Result<bool, BluetoothError> {
        self.link_command("connect", address).await
    }

    pub(crate) async fn disconnect(&self, address: &str) -> Result<bool, BluetoothError> {
        self.link_command("disconnect", address).await
    }

    async fn link_command(&self, verb: &str, address: &str) -> Result<bool, BluetoothError> {
        let output = Command::new("bluetoothctl")
            .args([verb, address])
            .output()
            .await
            .map_err(BluetoothError::CommandIo)?;

        if !output.status.success() {
            tracing::warn!(
                verb,
                %address,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "bluetoothctl command failed"
            );
            return Ok(false);
        }

        // bluetoothctl exits 0 even when the link attempt fails; the
        // "successful" marker in its stdout is the only usable signal.
        let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
        Ok(stdout.contains("successful"))
    }
}

/// Parse the full `bluetoothctl devices` output.
fn parse_device_list(output: &str) -> Vec<Device> {
    output
        .lines()
        .filter_map(parse_device_line)
        .map(|(address, name)| {
            let mut properties = Properties::new();
            properties.insert("class".to_string(), PropertyValue::from("unknown"));
            properties.insert(
                "services".to_string(),
                PropertyValue::Json(serde_json::json!([])),
            );
            let name = if name.is_empty() { None } else { Some(name) };
            crate::discovered(&address, name.as_deref(), properties)
        })
        .collect()
}

/// Parse one `Device <MAC> <name>` line. The name may contain spaces and
/// may be absent entirely.
fn parse_device_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("Device ")?;
    let (address, name) = rest.split_once(' ').unwrap_or((rest, ""));
    if !is_mac_address(address) {
        return None;
    }
    Some((address.to_string(), name.trim().to_string()))
}

fn is_mac_address(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}
