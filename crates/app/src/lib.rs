//! # homelite-app
//!
//! Application core — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement (driven/outbound ports):
//!   - `DeviceStore` — load-all / save-all persistence gateway
//!   - `DeviceBackend` — discovery/connection/command capability per device class
//! - Provide the use-case layer:
//!   - `DeviceRegistry` — the single source of truth for device state
//!   - `ActionDispatcher` — routes a generic command to the right backend
//!     and reconciles the result into persisted state
//!   - `DiscoveryScheduler` — periodic background discovery with cooperative
//!     cancellation
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `homelite-domain` only (plus `tokio::sync` for coordination).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod discovery;
pub mod dispatcher;
pub mod ports;
pub mod registry;
