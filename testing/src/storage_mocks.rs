//! In-memory storage testing utilities
//!
//! - [`InMemoryKeyValueStore`]: `HashMap`-backed store, shareable across clones
//! - [`FailingKeyValueStore`]: every write fails, for persistence-error paths

#![allow(clippy::missing_panics_doc)] // Lock poisoning is recovered, never panics

use event_booking_core::storage::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory key-value store for fast, deterministic testing.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// ledger and inspect (or tamper with) the stored values through another.
///
/// # Example
///
/// ```
/// use event_booking_testing::InMemoryKeyValueStore;
/// use event_booking_core::storage::KeyValueStore;
///
/// let store = InMemoryKeyValueStore::new();
/// store.put("availableSlots", "3").unwrap();
/// assert_eq!(store.get("availableSlots").unwrap().as_deref(), Some("3"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryKeyValueStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty in-memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Check if a key exists in the store
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.write().remove(key);
        Ok(())
    }
}

/// Store whose reads see an empty backend and whose writes always fail.
#[derive(Clone, Debug, Default)]
pub struct FailingKeyValueStore;

impl FailingKeyValueStore {
    /// Create a new failing store
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeyValueStore for FailingKeyValueStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn put(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(format!("write to {key} rejected")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(format!("remove of {key} rejected")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_data() {
        let store = InMemoryKeyValueStore::new();
        let observer = store.clone();

        store.put("bookings", "[]").unwrap();

        assert!(observer.contains_key("bookings"));
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn remove_absent_key_succeeds() {
        let store = InMemoryKeyValueStore::new();
        store.remove("missing").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn failing_store_rejects_writes() {
        let store = FailingKeyValueStore::new();
        assert!(store.get("bookings").unwrap().is_none());
        assert!(matches!(
            store.put("bookings", "[]"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.remove("bookings").is_err());
    }
}
