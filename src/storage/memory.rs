use std::collections::HashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use crate::error::GaiaError;
use super::{ChangeOrigin, StorageCallback, StorageEvent, Subscribers, Subscription, UserStorage};

/// In-process storage. Also stands in for the synced remote store in tests
/// through [`MemoryStorage::apply_remote`].
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, Value>>,
    subscribers: Subscribers,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value as if it had been synced from another device.
    pub fn apply_remote(&self, key: &str, value: Value) {
        self.values.write().insert(key.to_string(), value);
        self.subscribers.notify(&StorageEvent {
            key: key.to_string(),
            origin: ChangeOrigin::Remote,
        });
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Value>, GaiaError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), GaiaError> {
        self.values.write().insert(key.to_string(), value);
        self.subscribers.notify(&StorageEvent {
            key: key.to_string(),
            origin: ChangeOrigin::Local,
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), GaiaError> {
        let removed = self.values.write().remove(key).is_some();
        if removed {
            self.subscribers.notify(&StorageEvent {
                key: key.to_string(),
                origin: ChangeOrigin::Local,
            });
        }
        Ok(())
    }

    fn subscribe(&self, callback: StorageCallback) -> Subscription {
        self.subscribers.add(callback)
    }
}
