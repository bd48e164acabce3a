//! Backend port — discovery/connection/command capability per device class.
//!
//! One implementation exists per [`DeviceType`]: Bluetooth, MQTT, virtual.
//! Backends own the `status` vocabulary of their devices and convert their
//! internal IO failures into a logged diagnostic plus a `false` return —
//! a flaky radio or broker never surfaces as an error to the dispatcher.

use std::future::Future;
use std::sync::Arc;

use homelite_domain::device::{Device, DeviceCommand, DeviceType, actions, status};
use homelite_domain::error::HubError;

/// A pluggable device backend.
///
/// All methods except [`kind`](Self::kind) and [`execute`](Self::execute)
/// default to no-ops so that backends only implement the capabilities their
/// protocol actually has (MQTT devices, for example, are never discovered
/// or connected).
pub trait DeviceBackend: Send + Sync {
    /// The device class this backend handles.
    fn kind(&self) -> DeviceType;

    /// Sweep for reachable devices, returning normalized records.
    ///
    /// The default discovers nothing.
    fn discover(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        async { Ok(Vec::new()) }
    }

    /// Establish a connection to the device. `true` on success.
    fn connect(&self, _device: &Device) -> impl Future<Output = bool> + Send {
        async { false }
    }

    /// Tear down the connection to the device. `true` on success.
    fn disconnect(&self, _device: &Device) -> impl Future<Output = bool> + Send {
        async { false }
    }

    /// Pass an arbitrary command through to the device. `true` on success.
    fn send_command(
        &self,
        _device: &Device,
        _command: &DeviceCommand,
    ) -> impl Future<Output = bool> + Send {
        async { false }
    }

    /// Run one command against the device, mutating `status`/`properties`
    /// in place per backend rules, and report success.
    ///
    /// The default routes `connect`/`disconnect` through the capability
    /// methods — updating `status` only when the backend reports success —
    /// and hands everything else to [`send_command`](Self::send_command)
    /// with no status side effect. Backends with richer action vocabularies
    /// (the virtual one) override this wholesale.
    fn execute(
        &self,
        device: &mut Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = bool> + Send {
        async move {
            match command.action.as_str() {
                actions::CONNECT => {
                    let ok = self.connect(device).await;
                    if ok {
                        device.status = status::CONNECTED.to_string();
                    }
                    ok
                }
                actions::DISCONNECT => {
                    let ok = self.disconnect(device).await;
                    if ok {
                        device.status = status::DISCONNECTED.to_string();
                    }
                    ok
                }
                _ => self.send_command(device, command).await,
            }
        }
    }
}

impl<T: DeviceBackend> DeviceBackend for Arc<T> {
    fn kind(&self) -> DeviceType {
        (**self).kind()
    }

    fn discover(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        (**self).discover()
    }

    fn connect(&self, device: &Device) -> impl Future<Output = bool> + Send {
        (**self).connect(device)
    }

    fn disconnect(&self, device: &Device) -> impl Future<Output = bool> + Send {
        (**self).disconnect(device)
    }

    fn send_command(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = bool> + Send {
        (**self).send_command(device, command)
    }

    fn execute(
        &self,
        device: &mut Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = bool> + Send {
        (**self).execute(device, command)
    }
}
