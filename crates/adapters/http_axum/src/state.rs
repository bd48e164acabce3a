//! Shared application state for axum handlers.

use std::sync::Arc;

use homelite_app::dispatcher::ActionDispatcher;
use homelite_app::ports::{DeviceBackend, DeviceStore};
use homelite_app::registry::DeviceRegistry;
use homelite_domain::time::{Timestamp, now};

/// Application state shared across all axum handlers.
///
/// Generic over the store and backend types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do
/// not need to be `Clone` — only the `Arc` wrappers (and the optional
/// Bluetooth handle) are cloned.
pub struct AppState<S, B, M, V> {
    /// The authoritative device collection.
    pub registry: Arc<DeviceRegistry<S>>,
    /// Command routing.
    pub dispatcher: Arc<ActionDispatcher<S, B, M, V>>,
    /// Bluetooth backend for the on-demand `/api/devices/discover` sweep.
    /// `None` when Bluetooth is not wired up.
    pub bluetooth: Option<B>,
    /// Process start time, reported by `/api/system/info`.
    pub started_at: Timestamp,
}

impl<S, B: Clone, M, V> Clone for AppState<S, B, M, V> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            dispatcher: Arc::clone(&self.dispatcher),
            bluetooth: self.bluetooth.clone(),
            started_at: self.started_at,
        }
    }
}

impl<S, B, M, V> AppState<S, B, M, V>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    /// Create the state from pre-wrapped shared services.
    pub fn new(
        registry: Arc<DeviceRegistry<S>>,
        dispatcher: Arc<ActionDispatcher<S, B, M, V>>,
        bluetooth: Option<B>,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            bluetooth,
            started_at: now(),
        }
    }
}
