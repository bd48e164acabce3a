//! Device registry — the single source of truth for device state.
//!
//! An in-memory map guarded by an [`RwLock`] (one writer at a time, readers
//! see a consistent snapshot) mirrored to a [`DeviceStore`]. Every mutating
//! operation persists the full snapshot while still holding the write
//! guard, which both serializes whole-file rewrites and guarantees that a
//! successful call left memory and disk in agreement. A failed save
//! surfaces as [`HubError::Persistence`] instead of being swallowed.

use std::collections::HashMap;

use tokio::sync::RwLock;

use homelite_domain::device::{Device, DeviceDraft, DevicePatch, DeviceType, status};
use homelite_domain::error::{HubError, NotFoundError};
use homelite_domain::id::DeviceId;
use homelite_domain::time::now;

use crate::ports::DeviceStore;

/// Authoritative in-memory device collection plus its persistence mirror.
pub struct DeviceRegistry<S> {
    devices: RwLock<HashMap<DeviceId, Device>>,
    store: S,
}

fn not_found(id: &DeviceId) -> HubError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

impl<S: DeviceStore> DeviceRegistry<S> {
    /// Load the persisted device set and build the registry around it.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Persistence`] when the store cannot be read at
    /// all (individual malformed records are the store's concern and are
    /// skipped there).
    pub async fn load(store: S) -> Result<Self, HubError> {
        let loaded = store.load_all().await?;
        let mut devices = HashMap::with_capacity(loaded.len());
        for device in loaded {
            devices.insert(device.id.clone(), device);
        }
        tracing::info!(count = devices.len(), "device registry loaded");
        Ok(Self {
            devices: RwLock::new(devices),
            store,
        })
    }

    /// List devices, optionally filtered by type, sorted by id.
    pub async fn list(&self, kind: Option<DeviceType>) -> Vec<Device> {
        let guard = self.devices.read().await;
        let mut out: Vec<Device> = guard
            .values()
            .filter(|device| kind.is_none_or(|k| device.kind == k))
            .cloned()
            .collect();
        out.sort_by_key(|device| device.id.clone());
        out
    }

    /// Look up a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no device with `id` exists.
    pub async fn get(&self, id: &DeviceId) -> Result<Device, HubError> {
        let guard = self.devices.read().await;
        guard.get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Register a new device: fresh unique id, status `"offline"`, stamped
    /// `last_seen`, and the default action list for its type.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for an empty name, or
    /// [`HubError::Persistence`] when the save fails.
    #[tracing::instrument(skip(self, draft), fields(device_name = %draft.name))]
    pub async fn create(&self, draft: DeviceDraft) -> Result<Device, HubError> {
        let mut guard = self.devices.write().await;

        let mut id = DeviceId::random();
        while guard.contains_key(&id) {
            id = DeviceId::random();
        }

        let device = Device {
            id: id.clone(),
            name: draft.name,
            kind: draft.kind,
            address: draft.address,
            status: status::OFFLINE.to_string(),
            properties: draft.properties,
            last_seen: Some(now()),
            actions: draft.kind.default_actions(),
        };
        device.validate()?;

        guard.insert(id, device.clone());
        self.persist(&guard).await?;

        tracing::info!(id = %device.id, "created device");
        Ok(device)
    }

    /// Apply a partial patch, re-stamping `last_seen`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] for an unknown id,
    /// [`HubError::Validation`] when the patch empties the name, or
    /// [`HubError::Persistence`] when the save fails.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &DeviceId, patch: DevicePatch) -> Result<Device, HubError> {
        let mut guard = self.devices.write().await;
        let Some(existing) = guard.get(id) else {
            return Err(not_found(id));
        };

        let mut updated = existing.clone();
        patch.apply_to(&mut updated);
        updated.validate()?;
        updated.last_seen = Some(now());

        guard.insert(id.clone(), updated.clone());
        self.persist(&guard).await?;

        tracing::info!(id = %updated.id, "updated device");
        Ok(updated)
    }

    /// Remove a device. Returns `false` (not an error) when the id is
    /// unknown or already deleted.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Persistence`] when the save fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &DeviceId) -> Result<bool, HubError> {
        let mut guard = self.devices.write().await;
        if guard.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(&guard).await?;

        tracing::info!(%id, "deleted device");
        Ok(true)
    }

    /// Reconcile a freshly discovered device into the registry.
    ///
    /// Unknown id: auto-create, deriving the default action list from the
    /// device type. Known id: refresh `status`, fold the discovered
    /// properties in, and re-stamp `last_seen` — `name`, `type`, `address`
    /// and `actions` are left alone so user edits survive rediscovery.
    /// Discovery never deletes a device that stopped appearing.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Persistence`] when the save fails.
    pub async fn merge_discovered(&self, discovered: Device) -> Result<Device, HubError> {
        let mut guard = self.devices.write().await;

        let merged = match guard.get(&discovered.id) {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.status = discovered.status;
                updated.properties.extend(discovered.properties);
                updated.last_seen = Some(now());
                updated
            }
            None => {
                tracing::info!(id = %discovered.id, name = %discovered.name, "registered discovered device");
                let mut created = discovered;
                created.actions = created.kind.default_actions();
                created.last_seen = Some(now());
                created
            }
        };

        guard.insert(merged.id.clone(), merged.clone());
        self.persist(&guard).await?;
        Ok(merged)
    }

    /// Write back a device mutated by an action execution, re-stamping
    /// `last_seen` and persisting. This is the dispatcher's finalization
    /// step and runs exactly once per call.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the record was deleted while the
    /// action was in flight (ids are never resurrected), or
    /// [`HubError::Persistence`] when the save fails.
    pub async fn commit(&self, mut device: Device) -> Result<Device, HubError> {
        let mut guard = self.devices.write().await;
        if !guard.contains_key(&device.id) {
            return Err(not_found(&device.id));
        }

        device.last_seen = Some(now());
        guard.insert(device.id.clone(), device.clone());
        self.persist(&guard).await?;
        Ok(device)
    }

    /// Snapshot the map (sorted by id for stable output) and hand it to
    /// the store. Callers hold the write guard, so saves never interleave.
    async fn persist(&self, devices: &HashMap<DeviceId, Device>) -> Result<(), HubError> {
        let mut snapshot: Vec<Device> = devices.values().cloned().collect();
        snapshot.sort_by_key(|device| device.id.clone());
        self.store.save_all(snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use homelite_domain::error::ValidationError;
    use homelite_domain::property::{Properties, PropertyValue};

    #[derive(Default)]
    struct InMemoryStore {
        saved: Mutex<Vec<Device>>,
        fail_saves: AtomicBool,
    }

    // Minimal local error type for scripted save failures.
    #[derive(Debug)]
    struct SaveFailed;

    impl std::fmt::Display for SaveFailed {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("save failed")
        }
    }

    impl std::error::Error for SaveFailed {}

    impl DeviceStore for InMemoryStore {
        async fn load_all(&self) -> Result<Vec<Device>, HubError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save_all(&self, devices: Vec<Device>) -> Result<(), HubError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(HubError::Persistence(Box::new(SaveFailed)));
            }
            *self.saved.lock().unwrap() = devices;
            Ok(())
        }
    }

    async fn registry() -> DeviceRegistry<InMemoryStore> {
        DeviceRegistry::load(InMemoryStore::default()).await.unwrap()
    }

    fn draft(name: &str, kind: DeviceType) -> DeviceDraft {
        DeviceDraft {
            name: name.to_string(),
            kind,
            address: None,
            properties: Properties::new(),
        }
    }

    fn discovered(address: &str, name: &str) -> Device {
        Device {
            id: DeviceId::from_address(address),
            name: name.to_string(),
            kind: DeviceType::Bluetooth,
            address: Some(address.to_string()),
            status: "online".to_string(),
            properties: Properties::new(),
            last_seen: None,
            actions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn should_create_device_with_offline_status_and_default_actions() {
        let reg = registry().await;

        let created = reg.create(draft("Desk Lamp", DeviceType::Virtual)).await.unwrap();

        let fetched = reg.get(&created.id).await.unwrap();
        assert_eq!(fetched.status, "offline");
        assert_eq!(fetched.actions, vec!["on".to_string(), "off".to_string()]);
        assert!(fetched.last_seen.is_some());
    }

    #[tokio::test]
    async fn should_reject_create_when_name_is_empty() {
        let reg = registry().await;

        let result = reg.create(draft("", DeviceType::Virtual)).await;

        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyName))
        ));
        assert!(reg.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn should_list_devices_filtered_by_type() {
        let reg = registry().await;
        reg.create(draft("Lamp", DeviceType::Virtual)).await.unwrap();
        reg.create(draft("Speaker", DeviceType::Bluetooth)).await.unwrap();

        let all = reg.list(None).await;
        let virtuals = reg.list(Some(DeviceType::Virtual)).await;

        assert_eq!(all.len(), 2);
        assert_eq!(virtuals.len(), 1);
        assert_eq!(virtuals[0].name, "Lamp");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_id() {
        let reg = registry().await;
        let result = reg.get(&DeviceId::random()).await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_apply_patch_and_restamp_last_seen() {
        let reg = registry().await;
        let created = reg.create(draft("Lamp", DeviceType::Virtual)).await.unwrap();
        let before = created.last_seen.unwrap();

        let updated = reg
            .update(
                &created.id,
                DevicePatch {
                    status: Some("online".to_string()),
                    ..DevicePatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, "online");
        assert_eq!(updated.name, "Lamp");
        assert!(updated.last_seen.unwrap() >= before);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_unknown_id() {
        let reg = registry().await;
        let result = reg.update(&DeviceId::random(), DevicePatch::default()).await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_then_report_not_found() {
        let reg = registry().await;
        let created = reg.create(draft("Lamp", DeviceType::Virtual)).await.unwrap();

        assert!(reg.delete(&created.id).await.unwrap());
        assert!(matches!(
            reg.get(&created.id).await,
            Err(HubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_return_false_when_deleting_twice() {
        let reg = registry().await;
        let created = reg.create(draft("Lamp", DeviceType::Virtual)).await.unwrap();

        assert!(reg.delete(&created.id).await.unwrap());
        assert!(!reg.delete(&created.id).await.unwrap());
        assert!(!reg.delete(&DeviceId::random()).await.unwrap());
    }

    #[tokio::test]
    async fn should_surface_persistence_failure_to_caller() {
        let store = InMemoryStore::default();
        store.fail_saves.store(true, Ordering::SeqCst);
        let reg = DeviceRegistry::load(store).await.unwrap();

        let result = reg.create(draft("Lamp", DeviceType::Virtual)).await;

        assert!(matches!(result, Err(HubError::Persistence(_))));
    }

    #[tokio::test]
    async fn should_auto_create_discovered_device_with_default_actions() {
        let reg = registry().await;

        let merged = reg
            .merge_discovered(discovered("00:11:22:33:44:55", "Speaker"))
            .await
            .unwrap();

        assert_eq!(merged.id.as_str(), "001122334455");
        assert_eq!(merged.status, "online");
        assert_eq!(
            merged.actions,
            vec!["connect".to_string(), "disconnect".to_string()]
        );
        assert!(merged.last_seen.is_some());
    }

    #[tokio::test]
    async fn should_merge_rediscovery_without_creating_second_record() {
        let reg = registry().await;
        reg.merge_discovered(discovered("00:11:22:33:44:55", "Speaker"))
            .await
            .unwrap();

        let again = reg
            .merge_discovered(discovered("00:11:22:33:44:55", "Speaker"))
            .await
            .unwrap();

        assert_eq!(reg.list(None).await.len(), 1);
        assert_eq!(again.id.as_str(), "001122334455");
    }

    #[tokio::test]
    async fn should_keep_user_edits_when_rediscovered() {
        let reg = registry().await;
        let merged = reg
            .merge_discovered(discovered("00:11:22:33:44:55", "Speaker"))
            .await
            .unwrap();
        reg.update(
            &merged.id,
            DevicePatch {
                name: Some("Kitchen Speaker".to_string()),
                ..DevicePatch::default()
            },
        )
        .await
        .unwrap();

        let mut rediscovered = discovered("00:11:22:33:44:55", "Speaker");
        rediscovered
            .properties
            .insert("rssi".to_string(), PropertyValue::Int(-60));
        let after = reg.merge_discovered(rediscovered).await.unwrap();

        assert_eq!(after.name, "Kitchen Speaker");
        assert_eq!(
            after.properties.get("rssi"),
            Some(&PropertyValue::Int(-60))
        );
    }

    #[tokio::test]
    async fn should_refuse_commit_for_deleted_device() {
        let reg = registry().await;
        let created = reg.create(draft("Lamp", DeviceType::Virtual)).await.unwrap();
        reg.delete(&created.id).await.unwrap();

        let result = reg.commit(created).await;

        assert!(matches!(result, Err(HubError::NotFound(_))));
        assert!(reg.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn should_persist_snapshot_sorted_by_id() {
        let reg = registry().await;
        reg.create(draft("One", DeviceType::Virtual)).await.unwrap();
        reg.create(draft("Two", DeviceType::Virtual)).await.unwrap();

        let saved = reg.store.saved.lock().unwrap().clone();
        assert_eq!(saved.len(), 2);
        assert!(saved[0].id <= saved[1].id);
    }
}
