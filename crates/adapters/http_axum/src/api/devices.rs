//! JSON REST handlers for devices.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Deserialize;

use homelite_app::ports::{DeviceBackend, DeviceStore};
use homelite_domain::device::{Device, DeviceCommand, DeviceDraft, DevicePatch, DeviceType};
use homelite_domain::error::{HubError, NotFoundError};
use homelite_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Device routes under `/api/devices`.
pub fn routes<S, B, M, V>() -> axum::Router<AppState<S, B, M, V>>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/discover", post(discover))
        .route("/{id}", get(get_device).put(update).delete(delete_device))
        .route("/{id}/action", post(execute_action))
}

/// Query parameters for the list endpoint.
#[derive(Deserialize)]
struct ListQuery {
    /// Optional device-type filter token (`bluetooth`, `mqtt`, …).
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn list<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Device>>, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    let kind = query
        .kind
        .as_deref()
        .map(DeviceType::from_str)
        .transpose()
        .map_err(HubError::from)?;

    Ok(Json(state.registry.list(kind).await))
}

async fn create<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Json(draft): Json<DeviceDraft>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    let device = state.registry.create(draft).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

async fn get_device<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Path(id): Path<DeviceId>,
) -> Result<Json<Device>, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    Ok(Json(state.registry.get(&id).await?))
}

async fn update<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Path(id): Path<DeviceId>,
    Json(patch): Json<DevicePatch>,
) -> Result<Json<Device>, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    Ok(Json(state.registry.update(&id, patch).await?))
}

async fn delete_device<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Path(id): Path<DeviceId>,
) -> Result<StatusCode, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    if state.registry.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HubError::from(NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })
        .into())
    }
}

async fn execute_action<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
    Path(id): Path<DeviceId>,
    Json(command): Json<DeviceCommand>,
) -> Result<Json<Device>, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    Ok(Json(state.dispatcher.execute_action(&id, command).await?))
}

/// Run one on-demand Bluetooth sweep, merge the hits, and return them.
///
/// With no Bluetooth backend wired up the sweep trivially finds nothing.
async fn discover<S, B, M, V>(
    State(state): State<AppState<S, B, M, V>>,
) -> Result<Json<Vec<Device>>, ApiError>
where
    S: DeviceStore + 'static,
    B: DeviceBackend + Clone + 'static,
    M: DeviceBackend + 'static,
    V: DeviceBackend + 'static,
{
    let Some(bluetooth) = &state.bluetooth else {
        tracing::warn!("discover requested but no Bluetooth backend is wired up");
        return Ok(Json(Vec::new()));
    };

    let found = bluetooth.discover().await?;
    let mut merged = Vec::with_capacity(found.len());
    for device in found {
        merged.push(state.registry.merge_discovered(device).await?);
    }
    Ok(Json(merged))
}
