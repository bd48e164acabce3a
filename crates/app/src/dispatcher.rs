//! Action dispatcher — routes a generic command to the right backend and
//! reconciles the outcome into persisted state.
//!
//! Each call is an independent state machine: resolve the device, select
//! the backend for its type, execute off the registry lock, then finalize.
//! The finalization step — re-stamp `last_seen` and persist — runs exactly
//! once per call no matter what the backend reported, so callers always
//! receive the updated device even for unsupported types or failed actions.

use std::sync::Arc;

use homelite_domain::device::{Device, DeviceCommand, DeviceType};
use homelite_domain::error::HubError;
use homelite_domain::id::DeviceId;

use crate::ports::{DeviceBackend, DeviceStore};
use crate::registry::DeviceRegistry;

/// Routes device commands to per-type backends.
///
/// Backend slots are optional: a device whose type has no registered
/// backend still gets the stamp-and-persist finalization, it just has no
/// side effect (logged as a warning).
pub struct ActionDispatcher<S, B, M, V> {
    registry: Arc<DeviceRegistry<S>>,
    bluetooth: Option<B>,
    mqtt: Option<M>,
    virtual_backend: Option<V>,
}

impl<S, B, M, V> ActionDispatcher<S, B, M, V>
where
    S: DeviceStore,
    B: DeviceBackend,
    M: DeviceBackend,
    V: DeviceBackend,
{
    /// Create a dispatcher over the shared registry and backend slots.
    pub fn new(
        registry: Arc<DeviceRegistry<S>>,
        bluetooth: Option<B>,
        mqtt: Option<M>,
        virtual_backend: Option<V>,
    ) -> Self {
        Self {
            registry,
            bluetooth,
            mqtt,
            virtual_backend,
        }
    }

    /// Execute a named action against a device and return the updated
    /// record.
    ///
    /// A backend-reported failure does not abort the call: the device is
    /// still re-stamped and persisted, and the (status-unchanged) record is
    /// returned successfully.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown id, or
    /// [`HubError::Persistence`] when the finalizing save fails.
    #[tracing::instrument(skip(self, command), fields(action = %command.action))]
    pub async fn execute_action(
        &self,
        id: &DeviceId,
        command: DeviceCommand,
    ) -> Result<Device, HubError> {
        let mut device = self.registry.get(id).await?;

        match device.kind {
            DeviceType::Bluetooth => {
                run_backend(self.bluetooth.as_ref(), &mut device, &command).await;
            }
            DeviceType::Mqtt => {
                run_backend(self.mqtt.as_ref(), &mut device, &command).await;
            }
            DeviceType::Virtual => {
                run_backend(self.virtual_backend.as_ref(), &mut device, &command).await;
            }
            DeviceType::Other => {
                tracing::warn!(id = %device.id, "no backend handles this device type");
            }
        }

        self.registry.commit(device).await
    }
}

/// Run the backend if the slot is filled; log (never propagate) failures.
async fn run_backend<T: DeviceBackend>(
    backend: Option<&T>,
    device: &mut Device,
    command: &DeviceCommand,
) {
    match backend {
        Some(backend) => {
            let ok = backend.execute(device, command).await;
            if !ok {
                tracing::warn!(
                    id = %device.id,
                    action = %command.action,
                    "backend reported failure"
                );
            }
        }
        None => {
            tracing::warn!(
                id = %device.id,
                kind = %device.kind,
                "no backend registered for device type"
            );
        }
    }
}
