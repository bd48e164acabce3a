//! Native scanning strategy backed by btleplug.
//!
//! Discovery starts a scan, consumes central events until the fixed window
//! elapses, then stops the scan and returns whatever peripherals were seen.
//! Connect/disconnect look the peripheral up by MAC in the central's cache,
//! so a device generally needs to have been discovered before it can be
//! linked.

use std::collections::HashMap;
use std::time::Duration;

use btleplug::api::{BDAddr, Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio_stream::StreamExt as _;

use homelite_domain::device::Device;
use homelite_domain::property::{Properties, PropertyValue};

use crate::error::BluetoothError;

pub(crate) struct NativeStrategy {
    central: Adapter,
    scan_window: Duration,
}

impl NativeStrategy {
    /// Probe the host for a usable adapter. Called once at startup.
    pub(crate) async fn probe(scan_window: Duration) -> Result<Self, BluetoothError> {
        let manager = Manager::new().await?;
        let central = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BluetoothError::NotAvailable)?;
        Ok(Self {
            central,
            scan_window,
        })
    }

    /// Run one scan for the fixed window and return normalized devices.
    pub(crate) async fn scan(&self) -> Result<Vec<Device>, BluetoothError> {
        let mut events = self.central.events().await?;
        self.central.start_scan(ScanFilter::default()).await?;

        let deadline = tokio::time::Instant::now() + self.scan_window;
        let mut found: HashMap<BDAddr, Device> = HashMap::new();

        while tokio::time::Instant::now() < deadline {
            let remaining = deadline - tokio::time::Instant::now();
            match tokio::time::timeout(remaining, events.next()).await {
                Ok(Some(
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id),
                )) => {
                    if let Ok(peripheral) = self.central.peripheral(&id).await
                        && let Ok(Some(props)) = peripheral.properties().await
                    {
                        let mut properties = Properties::new();
                        if let Some(rssi) = props.rssi {
                            properties
                                .insert("rssi".to_string(), PropertyValue::Int(i64::from(rssi)));
                        }
                        let services: Vec<String> =
                            props.services.iter().map(ToString::to_string).collect();
                        properties.insert(
                            "services".to_string(),
                            PropertyValue::Json(serde_json::json!(services)),
                        );

                        let device = crate::discovered(
                            &props.address.to_string(),
                            props.local_name.as_deref(),
                            properties,
                        );
                        found.insert(props.address, device);
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        if let Err(err) = self.central.stop_scan().await {
            tracing::debug!(%err, "failed to stop native scan");
        }

        tracing::info!(count = found.len(), "native Bluetooth scan complete");
        Ok(found.into_values().collect())
    }

    /// Connect to the peripheral with the given MAC. `Ok(false)` when the
    /// peripheral is not in the central's cache.
    pub(crate) async fn connect(&self, address: &str) -> Result<bool, BluetoothError> {
        let Some(peripheral) = self.find_peripheral(address).await? else {
            tracing::warn!(%address, "peripheral not seen by any scan yet");
            return Ok(false);
        };
        peripheral.connect().await?;
        Ok(true)
    }

    /// Disconnect from the peripheral with the given MAC.
    pub(crate) async fn disconnect(&self, address: &str) -> Result<bool, BluetoothError> {
        let Some(peripheral) = self.find_peripheral(address).await? else {
            tracing::warn!(%address, "peripheral not seen by any scan yet");
            return Ok(false);
        };
        peripheral.disconnect().await?;
        Ok(true)
    }

    async fn find_peripheral(
        &self,
        address: &str,
    ) -> Result<Option<Peripheral>, BluetoothError> {
        for peripheral in self.central.peripherals().await? {
            if let Ok(Some(props)) = peripheral.properties().await
                && props.address.to_string().eq_ignore_ascii_case(address)
            {
                return Ok(Some(peripheral));
            }
        }
        Ok(None)
    }
}
