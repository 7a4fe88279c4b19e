use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::Value;
use crate::config::paths::storage_dir;
use crate::error::{ErrorKind, GaiaError};
use super::{ChangeOrigin, StorageCallback, StorageEvent, Subscribers, Subscription, UserStorage};

/// One pretty-printed JSON file per key under a directory.
pub struct FileStorage {
    dir: PathBuf,
    subscribers: Subscribers,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileStorage { dir: dir.into(), subscribers: Subscribers::new() }
    }

    /// Storage rooted at the platform app-data directory.
    pub fn in_app_data() -> Self {
        Self::new(storage_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl UserStorage for FileStorage {
    async fn read(&self, key: &str) -> Result<Option<Value>, GaiaError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| GaiaError::new(
                    ErrorKind::Json,
                    format!("Failed to parse stored value: {}", e),
                    "storage_read"
                ).with_context(format!("path: {:?}", path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GaiaError::new(
                ErrorKind::Io,
                format!("Failed to read stored value: {}", e),
                "storage_read"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), GaiaError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GaiaError::persistence(
                format!("Failed to create storage directory: {}", e),
                "storage_write"
            ).with_context(format!("path: {:?}", self.dir)))?;

        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| GaiaError::new(
                ErrorKind::Json,
                format!("Failed to serialize value: {}", e),
                "json_serialize"
            ))?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| GaiaError::persistence(
                format!("Failed to write stored value: {}", e),
                "storage_write"
            ).with_context(format!("path: {:?}", path)))?;

        self.subscribers.notify(&StorageEvent { key: key.to_string(), origin: ChangeOrigin::Local });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), GaiaError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                self.subscribers.notify(&StorageEvent { key: key.to_string(), origin: ChangeOrigin::Local });
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GaiaError::persistence(
                format!("Failed to remove stored value: {}", e),
                "storage_remove"
            ).with_context(format!("path: {:?}", path))),
        }
    }

    fn subscribe(&self, callback: StorageCallback) -> Subscription {
        self.subscribers.add(callback)
    }
}
