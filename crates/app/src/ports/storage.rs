//! Storage port — the persistence gateway for device records.
//!
//! The registry calls `save_all` synchronously around every mutation, so a
//! successful call implies in-memory and persisted state agree. Saves are
//! whole-snapshot rewrites; the registry serializes writers, and the
//! implementation must hold exclusive access to its medium for the duration
//! of one save.

use std::future::Future;
use std::sync::Arc;

use homelite_domain::device::Device;
use homelite_domain::error::HubError;

/// Load-all / save-all persistence for device records.
pub trait DeviceStore: Send + Sync {
    /// Load every persisted device. Called once at startup.
    ///
    /// Implementations skip malformed records with a logged warning rather
    /// than failing the whole load.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// Persist the full device set, replacing whatever was stored before.
    /// Idempotent.
    fn save_all(&self, devices: Vec<Device>) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: DeviceStore> DeviceStore for Arc<T> {
    fn load_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        (**self).load_all()
    }

    fn save_all(&self, devices: Vec<Device>) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).save_all(devices)
    }
}
