/*!
Key-value storage adapters backing the version store.

This module defines the storage abstraction (port) and concrete implementations
(adapters). The version store only ever needs three capabilities from its
substrate: read a string by key, write a string under a key, and remove a key.
Everything above this layer stays independent of where the strings end up.
*/

#[cfg(feature = "file")]
pub mod file;

use crate::{CvError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage abstraction for string values addressed by key
///
/// Implementations report failures through `Result`; it is the caller's job to
/// decide whether a failure is fatal. The version store absorbs them.
pub trait KeyValueStore {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// `Ok(None)` when the key has never been written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-process storage backed by a `HashMap`
///
/// Clones share the same map, so a clone handed to a second version store
/// observes the same "storage lifetime" as the first.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| CvError::storage("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// Re-export types for convenience
#[cfg(feature = "file")]
pub use file::FileStore;
