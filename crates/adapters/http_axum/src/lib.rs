//! # homelite-adapter-http-axum
//!
//! REST transport over the application core. Thin by design: handlers
//! deserialize, call into the registry/dispatcher, and serialize the
//! result — no device logic lives here.
//!
//! ## Routes
//!
//! | Method | Path | Maps to |
//! |--------|------|---------|
//! | GET | `/health` | liveness probe |
//! | GET | `/api/devices?type=` | `DeviceRegistry::list` |
//! | POST | `/api/devices` | `DeviceRegistry::create` |
//! | GET/PUT/DELETE | `/api/devices/{id}` | get / update / delete |
//! | POST | `/api/devices/{id}/action` | `ActionDispatcher::execute_action` |
//! | POST | `/api/devices/discover` | on-demand Bluetooth sweep + merge |
//! | GET | `/api/system/info` | version / platform / device count / uptime |
//!
//! ## Dependency rule
//!
//! Depends on `homelite-app` and `homelite-domain` only.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
