//! JSON API route assembly.

pub mod devices;
pub mod system;

use axum::Router;

use homelite_app::ports::{DeviceBackend, DeviceStore};

use crate::state::AppState;

/// All `/api` routes.
pub fn routes<S, B, M, V>() -> Router<AppState<S, B, M, V>>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    Router::new()
        .nest("/devices", devices::routes())
        .nest("/system", system::routes())
}
