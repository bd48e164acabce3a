//! # homelite-adapter-virtual
//!
//! Virtual backend — simulated devices that live entirely in the registry.
//!
//! `on`/`off` flip the device's `status` and mirror it into
//! `properties["state"]`. Every other action is stored verbatim as
//! `properties[action] = value`, leaving `status` untouched — the pattern
//! other backends follow for forward-compatible custom commands.
//!
//! ## Dependency rule
//!
//! Depends on `homelite-app` (port traits) and `homelite-domain` only.

use homelite_app::ports::DeviceBackend;
use homelite_domain::device::{Device, DeviceCommand, DeviceType, actions};
use homelite_domain::property::PropertyValue;

/// Backend for simulated devices. Carries no state of its own; everything
/// lives on the device record.
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualBackend;

impl DeviceBackend for VirtualBackend {
    fn kind(&self) -> DeviceType {
        DeviceType::Virtual
    }

    async fn execute(&self, device: &mut Device, command: &DeviceCommand) -> bool {
        match command.action.as_str() {
            actions::ON => {
                device.status = actions::ON.to_string();
                device
                    .properties
                    .insert("state".to_string(), PropertyValue::from(actions::ON));
            }
            actions::OFF => {
                device.status = actions::OFF.to_string();
                device
                    .properties
                    .insert("state".to_string(), PropertyValue::from(actions::OFF));
            }
            other => {
                device.properties.insert(
                    other.to_string(),
                    command.value.clone().unwrap_or(PropertyValue::Null),
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelite_domain::id::DeviceId;
    use homelite_domain::property::Properties;

    fn lamp() -> Device {
        Device {
            id: DeviceId::random(),
            name: "Desk Lamp".to_string(),
            kind: DeviceType::Virtual,
            address: None,
            status: "offline".to_string(),
            properties: Properties::new(),
            last_seen: None,
            actions: DeviceType::Virtual.default_actions(),
        }
    }

    #[tokio::test]
    async fn should_turn_on_and_mirror_state_property() {
        let backend = VirtualBackend;
        let mut device = lamp();

        let ok = backend
            .execute(&mut device, &DeviceCommand::named("on"))
            .await;

        assert!(ok);
        assert_eq!(device.status, "on");
        assert_eq!(
            device.properties.get("state"),
            Some(&PropertyValue::from("on"))
        );
    }

    #[tokio::test]
    async fn should_turn_off_and_mirror_state_property() {
        let backend = VirtualBackend;
        let mut device = lamp();
        backend
            .execute(&mut device, &DeviceCommand::named("on"))
            .await;

        let ok = backend
            .execute(&mut device, &DeviceCommand::named("off"))
            .await;

        assert!(ok);
        assert_eq!(device.status, "off");
        assert_eq!(
            device.properties.get("state"),
            Some(&PropertyValue::from("off"))
        );
    }

    #[tokio::test]
    async fn should_store_unrecognized_action_verbatim() {
        let backend = VirtualBackend;
        let mut device = lamp();

        let ok = backend
            .execute(
                &mut device,
                &DeviceCommand {
                    action: "brightness".to_string(),
                    value: Some(PropertyValue::Int(80)),
                },
            )
            .await;

        assert!(ok);
        assert_eq!(device.status, "offline");
        assert_eq!(
            device.properties.get("brightness"),
            Some(&PropertyValue::Int(80))
        );
    }

    #[tokio::test]
    async fn should_store_null_when_action_has_no_value() {
        let backend = VirtualBackend;
        let mut device = lamp();

        backend
            .execute(&mut device, &DeviceCommand::named("blink"))
            .await;

        assert_eq!(device.properties.get("blink"), Some(&PropertyValue::Null));
    }

    #[tokio::test]
    async fn should_report_virtual_kind() {
        assert_eq!(VirtualBackend.kind(), DeviceType::Virtual);
    }
}
