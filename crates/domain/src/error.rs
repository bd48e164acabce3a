//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! at the port boundary. Adapter call failures at runtime are deliberately
//! *not* part of this taxonomy: backends degrade them to a logged
//! diagnostic plus a `false` return, so a flaky radio never aborts a call.

/// Top-level error for registry and dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A domain invariant was violated by the caller's input.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested device does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence gateway failed to load or save device state.
    ///
    /// Surfaced to the caller: when a save fails, in-memory and on-disk
    /// state may diverge until the next successful save.
    #[error("persistence error")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A backend could not be constructed or probed.
    #[error("backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A lookup by id found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing that was looked up (e.g. `"Device"`).
    pub entity: &'static str,
    /// The identifier that missed.
    pub id: String,
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Device names must be non-empty.
    #[error("device name cannot be empty")]
    EmptyName,

    /// The given device-type token is not one of the known variants.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),
}
