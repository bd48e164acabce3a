//! Device identifier — a string key, unique across the registry.
//!
//! Two construction paths exist: manually registered devices get a fresh
//! UUIDv4 string, while discovered Bluetooth devices derive their id from
//! the hardware address (lower-cased, separators stripped) so that repeated
//! discoveries of the same radio collapse onto one record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a [`Device`](crate::device::Device).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Generate a fresh random identifier (UUIDv4 string).
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Derive the identifier for a discovered device from its hardware
    /// address: lower-cased, with `:` and `-` separators stripped.
    ///
    /// `"00:11:22:33:44:55"` becomes `"001122334455"`.
    #[must_use]
    pub fn from_address(address: &str) -> Self {
        let normalized: String = address
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self(normalized)
    }

    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DeviceId {
    type Err = InvalidDeviceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(InvalidDeviceId);
        }
        Ok(Self(s.to_string()))
    }
}

/// Error returned when parsing an empty device identifier.
#[derive(Debug, thiserror::Error)]
#[error("device id cannot be empty")]
pub struct InvalidDeviceId;
