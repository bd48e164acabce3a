//! Typed property values attached to devices.
//!
//! Backends stash arbitrary metadata here (discovered service classes,
//! custom command values, simulated state). The union is untagged so the
//! persisted JSON reads naturally and round-trips losslessly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered property bag keyed by property name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
