//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use homelite_app::ports::{DeviceBackend, DeviceStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts API routes under `/api` plus a bare `/health` probe, and adds a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level
/// using the `tracing` ecosystem.
pub fn build<S, B, M, V>(state: AppState<S, B, M, V>) -> Router
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
