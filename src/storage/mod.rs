//! User-scoped key-value storage the engine persists through.
//!
//! Values are JSON blobs. Reads of unknown keys return `None`, never an error.
//! Every successful write or remove notifies subscribers, including writes that
//! arrive from another device.

pub mod file;
pub mod memory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use crate::error::GaiaError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written by this process.
    Local,
    /// Synced in from elsewhere (another tab or device).
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub origin: ChangeOrigin,
}

pub type StorageCallback = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Value>, GaiaError>;
    async fn write(&self, key: &str, value: Value) -> Result<(), GaiaError>;
    async fn remove(&self, key: &str) -> Result<(), GaiaError>;
    /// Register a change listener. It stays attached while the returned
    /// [`Subscription`] is alive.
    fn subscribe(&self, callback: StorageCallback) -> Subscription;
}

type Listeners = RwLock<Vec<(u64, StorageCallback)>>;

/// Listener registry shared by the storage backends.
#[derive(Clone, Default)]
pub struct Subscribers {
    listeners: Arc<Listeners>,
    next_id: Arc<AtomicU64>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, callback: StorageCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, callback));
        Subscription { id, listeners: Arc::downgrade(&self.listeners) }
    }

    pub fn notify(&self, event: &StorageEvent) {
        // Snapshot first so a listener may subscribe or unsubscribe re-entrantly.
        let callbacks: Vec<StorageCallback> =
            self.listeners.read().iter().map(|(_, cb)| cb.clone()).collect();
        tracing::trace!(key = %event.key, listeners = callbacks.len(), "Storage change");
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`UserStorage::subscribe`]. Dropping it detaches the listener.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}
