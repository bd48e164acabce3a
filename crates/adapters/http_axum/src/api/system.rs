//! System information endpoints.

use axum::Json;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use homelite_app::ports::{DeviceBackend, DeviceStore};
use homelite_domain::time::now;

use crate::state::AppState;

/// System routes under `/api/system`.
pub fn routes<S, B, M, V>() -> axum::Router<AppState<S, B, M, V>>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    axum::Router::new().route("/info", get(info))
}

/// Snapshot of the running hub.
#[derive(Serialize)]
struct SystemInfo {
    version: &'static str,
    platform: &'static str,
    device_count: usize,
    uptime_secs: u64,
}

async fn info<S, B, M, V>(State(state): State<AppState<S, B, M, V>>) -> Json<SystemInfo>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    let device_count = state.registry.list(None).await.len();
    let uptime = now() - state.started_at;

    Json(SystemInfo {
        version: env!("CARGO_PKG_VERSION"),
        platform: std::env::consts::OS,
        device_count,
        uptime_secs: u64::try_from(uptime.num_seconds()).unwrap_or(0),
    })
}
