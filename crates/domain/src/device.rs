//! Device — the registry's unit of identity and state.
//!
//! A device pairs an immutable identity (`id`, `type`) with mutable state
//! (`name`, `status`, `properties`, `last_seen`). `status` is a free-text
//! token owned by the backend that manages the device; the registry never
//! validates it against a global vocabulary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::property::{Properties, PropertyValue};
use crate::time::Timestamp;

/// Well-known action names.
pub mod actions {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const PUBLISH: &str = "publish";
    pub const SUBSCRIBE: &str = "subscribe";
    pub const ON: &str = "on";
    pub const OFF: &str = "off";
}

/// Well-known status tokens. Backends may emit others.
pub mod status {
    pub const ONLINE: &str = "online";
    pub const OFFLINE: &str = "offline";
    pub const CONNECTED: &str = "connected";
    pub const DISCONNECTED: &str = "disconnected";
}

/// Which backend class handles a device. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Bluetooth,
    Mqtt,
    Virtual,
    Other,
}

impl DeviceType {
    /// Default action list for freshly created devices of this type.
    #[must_use]
    pub fn default_actions(self) -> Vec<String> {
        let names: &[&str] = match self {
            Self::Bluetooth => &[actions::CONNECT, actions::DISCONNECT],
            Self::Mqtt => &[actions::PUBLISH, actions::SUBSCRIBE],
            Self::Virtual => &[actions::ON, actions::OFF],
            Self::Other => &[],
        };
        names.iter().map(ToString::to_string).collect()
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bluetooth => f.write_str("bluetooth"),
            Self::Mqtt => f.write_str("mqtt"),
            Self::Virtual => f.write_str("virtual"),
            Self::Other => f.write_str("other"),
        }
    }
}

impl FromStr for DeviceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bluetooth" => Ok(Self::Bluetooth),
            "mqtt" => Ok(Self::Mqtt),
            "virtual" => Ok(Self::Virtual),
            "other" => Ok(Self::Other),
            other => Err(ValidationError::UnknownDeviceType(other.to_string())),
        }
    }
}

/// A registered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique identity. Never changes, never reused after deletion.
    pub id: DeviceId,
    /// Display name.
    pub name: String,
    /// Backend class. Fixed at creation; dispatch re-resolves the backend
    /// from this field on every call.
    #[serde(rename = "type")]
    pub kind: DeviceType,
    /// Backend-specific locator: MAC address, topic path, or none.
    #[serde(default)]
    pub address: Option<String>,
    /// Free-text state token, backend-owned vocabulary.
    pub status: String,
    /// Open backend-specific metadata.
    #[serde(default)]
    pub properties: Properties,
    /// Re-stamped on every mutation, discovery hit, and action execution.
    #[serde(default)]
    pub last_seen: Option<Timestamp>,
    /// Action names the device supports. Derived from `type` at creation
    /// and not recomputed afterwards.
    #[serde(default)]
    pub actions: Vec<String>,
}

impl Device {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when the name is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Request shape for registering a new device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

/// Partial field patch for an existing device. Only set fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevicePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<DeviceType>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl DevicePatch {
    /// Apply the set fields onto `device`.
    ///
    /// `actions` is intentionally left alone even when `type` changes:
    /// the action list is derived once at creation and kept as-is after.
    pub fn apply_to(&self, device: &mut Device) {
        if let Some(name) = &self.name {
            device.name = name.clone();
        }
        if let Some(kind) = self.kind {
            device.kind = kind;
        }
        if let Some(address) = &self.address {
            device.address = Some(address.clone());
        }
        if let Some(status) = &self.status {
            device.status = status.clone();
        }
        if let Some(properties) = &self.properties {
            device.properties = properties.clone();
        }
    }
}

/// A named command aimed at a device, with an optional value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Action name (`connect`, `on`, or any backend-defined token).
    pub action: String,
    /// Optional payload, stored verbatim by backends that accept
    /// arbitrary commands.
    #[serde(default)]
    pub value: Option<PropertyValue>,
}

impl DeviceCommand {
    /// Convenience constructor for a value-less command.
    #[must_use]
    pub fn named(action: &str) -> Self {
        Self {
            action: action.to_string(),
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device() -> Device {
        Device {
            id: DeviceId::from_address("00:11:22:33:44:55"),
            name: "Living Room Speaker".to_string(),
            kind: DeviceType::Bluetooth,
            address: Some("00:11:22:33:44:55".to_string()),
            status: status::OFFLINE.to_string(),
            properties: Properties::new(),
            last_seen: None,
            actions: DeviceType::Bluetooth.default_actions(),
        }
    }

    #[test]
    fn should_derive_bluetooth_default_actions() {
        assert_eq!(
            DeviceType::Bluetooth.default_actions(),
            vec!["connect".to_string(), "disconnect".to_string()]
        );
    }

    #[test]
    fn should_derive_mqtt_default_actions() {
        assert_eq!(
            DeviceType::Mqtt.default_actions(),
            vec!["publish".to_string(), "subscribe".to_string()]
        );
    }

    #[test]
    fn should_derive_virtual_default_actions() {
        assert_eq!(
            DeviceType::Virtual.default_actions(),
            vec!["on".to_string(), "off".to_string()]
        );
    }

    #[test]
    fn should_derive_no_actions_for_other() {
        assert!(DeviceType::Other.default_actions().is_empty());
    }

    #[test]
    fn should_roundtrip_device_type_through_display_and_from_str() {
        for kind in [
            DeviceType::Bluetooth,
            DeviceType::Mqtt,
            DeviceType::Virtual,
            DeviceType::Other,
        ] {
            let parsed: DeviceType = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn should_reject_unknown_device_type_token() {
        let result = DeviceType::from_str("zigbee");
        assert_eq!(
            result,
            Err(ValidationError::UnknownDeviceType("zigbee".to_string()))
        );
    }

    #[test]
    fn should_serialize_kind_under_type_key() {
        let device = sample_device();
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["type"], "bluetooth");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn should_roundtrip_device_through_serde_json() {
        let mut device = sample_device();
        device
            .properties
            .insert("class".to_string(), PropertyValue::from("audio"));
        device.last_seen = Some(crate::time::now());

        let json = serde_json::to_string(&device).unwrap();
        let parsed: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, device);
    }

    #[test]
    fn should_reject_empty_name() {
        let mut device = sample_device();
        device.name = "  ".to_string();
        assert_eq!(device.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_apply_only_set_patch_fields() {
        let mut device = sample_device();
        let patch = DevicePatch {
            status: Some("online".to_string()),
            ..DevicePatch::default()
        };

        patch.apply_to(&mut device);

        assert_eq!(device.status, "online");
        assert_eq!(device.name, "Living Room Speaker");
        assert_eq!(device.kind, DeviceType::Bluetooth);
    }

    #[test]
    fn should_keep_existing_actions_when_type_changes() {
        let mut device = sample_device();
        let patch = DevicePatch {
            kind: Some(DeviceType::Virtual),
            ..DevicePatch::default()
        };

        patch.apply_to(&mut device);

        assert_eq!(device.kind, DeviceType::Virtual);
        // The action list stays the one derived at creation.
        assert_eq!(
            device.actions,
            vec!["connect".to_string(), "disconnect".to_string()]
        );
    }

    #[test]
    fn should_replace_properties_wholesale_when_patched() {
        let mut device = sample_device();
        device
            .properties
            .insert("class".to_string(), PropertyValue::from("audio"));

        let mut new_props = Properties::new();
        new_props.insert("model".to_string(), PropertyValue::from("v2"));
        let patch = DevicePatch {
            properties: Some(new_props.clone()),
            ..DevicePatch::default()
        };

        patch.apply_to(&mut device);

        assert_eq!(device.properties, new_props);
    }

    #[test]
    fn should_deserialize_command_without_value() {
        let cmd: DeviceCommand = serde_json::from_str(r#"{"action": "connect"}"#).unwrap();
        assert_eq!(cmd.action, "connect");
        assert!(cmd.value.is_none());
    }

    #[test]
    fn should_deserialize_command_with_value() {
        let cmd: DeviceCommand =
            serde_json::from_str(r#"{"action": "brightness", "value": 80}"#).unwrap();
        assert_eq!(cmd.action, "brightness");
        assert_eq!(cmd.value, Some(PropertyValue::Int(80)));
    }

    #[test]
    fn should_deserialize_device_with_missing_optional_fields() {
        let json = r#"{
            "id": "abc",
            "name": "Bare Device",
            "type": "other",
            "status": "unknown"
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert!(device.address.is_none());
        assert!(device.properties.is_empty());
        assert!(device.last_seen.is_none());
        assert!(device.actions.is_empty());
    }
}
