//! # homelite-adapter-storage-json
//!
//! JSON-file persistence gateway. The whole device set lives in one file
//! (`devices.json` by default), rewritten in full on every save.
//!
//! Loading is lenient: a record that no longer deserializes is skipped with
//! a logged warning instead of failing the whole startup. Saving holds an
//! internal mutex for the duration of the write, so two saves can never
//! interleave on the file.
//!
//! ## Dependency rule
//!
//! Depends on `homelite-app` (port traits) and `homelite-domain` only.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use homelite_app::ports::DeviceStore;
use homelite_domain::device::Device;
use homelite_domain::error::HubError;

/// Errors specific to the JSON store.
#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    /// Reading or writing the device file failed.
    #[error("device file IO error")]
    Io(#[from] std::io::Error),

    /// The device file is not valid JSON at the top level.
    #[error("device file is not valid JSON")]
    Malformed(#[source] serde_json::Error),

    /// Serializing the device set failed.
    #[error("failed to serialize device set")]
    Serialize(#[source] serde_json::Error),
}

impl From<JsonStoreError> for HubError {
    fn from(err: JsonStoreError) -> Self {
        HubError::Persistence(Box::new(err))
    }
}

/// File-backed [`DeviceStore`].
pub struct JsonDeviceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDeviceStore {
    /// Create a store backed by the given file path. The file (and its
    /// parent directory) is created on the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<serde_json::Value>, JsonStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no device file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(JsonStoreError::Io(err)),
        };
        serde_json::from_str(&content).map_err(JsonStoreError::Malformed)
    }
}

impl DeviceStore for JsonDeviceStore {
    async fn load_all(&self) -> Result<Vec<Device>, HubError> {
        let records = self.read_records().await?;

        let mut devices = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<Device>(record) {
                Ok(device) => devices.push(device),
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed device record");
                }
            }
        }

        tracing::debug!(count = devices.len(), path = %self.path.display(), "loaded devices");
        Ok(devices)
    }

    async fn save_all(&self, devices: Vec<Device>) -> Result<(), HubError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(JsonStoreError::Io)?;
        }

        let json =
            serde_json::to_vec_pretty(&devices).map_err(JsonStoreError::Serialize)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(JsonStoreError::Io)?;

        tracing::debug!(count = devices.len(), path = %self.path.display(), "saved devices");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelite_domain::device::DeviceType;
    use homelite_domain::id::DeviceId;
    use homelite_domain::property::{Properties, PropertyValue};

    fn temp_store() -> JsonDeviceStore {
        let path = std::env::temp_dir()
            .join(format!("homelite-store-{}", uuid::Uuid::new_v4()))
            .join("devices.json");
        JsonDeviceStore::new(path)
    }

    fn device(name: &str) -> Device {
        let mut properties = Properties::new();
        properties.insert("class".to_string(), PropertyValue::from("audio"));
        Device {
            id: DeviceId::random(),
            name: name.to_string(),
            kind: DeviceType::Bluetooth,
            address: Some("00:11:22:33:44:55".to_string()),
            status: "offline".to_string(),
            properties,
            last_seen: Some(homelite_domain::time::now()),
            actions: DeviceType::Bluetooth.default_actions(),
        }
    }

    #[tokio::test]
    async fn should_return_empty_set_when_file_is_missing() {
        let store = temp_store();
        let devices = store.load_all().await.unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn should_roundtrip_device_set() {
        let store = temp_store();
        let devices = vec![device("Speaker"), device("Lamp")];

        store.save_all(devices.clone()).await.unwrap();
        let loaded = store.load_all().await.unwrap();

        assert_eq!(loaded, devices);
    }

    #[tokio::test]
    async fn should_be_stable_across_double_roundtrip() {
        let store = temp_store();
        let devices = vec![device("Speaker"), device("Lamp"), device("Fan")];

        store.save_all(devices.clone()).await.unwrap();
        let first = store.load_all().await.unwrap();
        store.save_all(first.clone()).await.unwrap();
        let second = store.load_all().await.unwrap();

        assert_eq!(second, first);
        assert_eq!(second.len(), devices.len());
    }

    #[tokio::test]
    async fn should_overwrite_previous_content_on_save() {
        let store = temp_store();
        store
            .save_all(vec![device("Speaker"), device("Lamp")])
            .await
            .unwrap();

        store.save_all(vec![device("Fan")]).await.unwrap();
        let loaded = store.load_all().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Fan");
    }

    #[tokio::test]
    async fn should_skip_malformed_records_but_keep_the_rest() {
        let store = temp_store();
        let good = device("Speaker");
        let content = serde_json::json!([
            good,
            {"name": "missing the rest"},
            42,
        ]);
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), serde_json::to_vec(&content).unwrap())
            .await
            .unwrap();

        let loaded = store.load_all().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Speaker");
    }

    #[tokio::test]
    async fn should_error_when_file_is_not_json_at_all() {
        let store = temp_store();
        tokio::fs::create_dir_all(store.path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.path(), b"not json").await.unwrap();

        let result = store.load_all().await;

        assert!(matches!(result, Err(HubError::Persistence(_))));
    }
}
