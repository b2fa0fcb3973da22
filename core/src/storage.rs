//! Key-value storage trait for durable ledger state.
//!
//! The ledger persists its whole state as a handful of string values under
//! well-known keys, the same shape a browser's local storage offers. Writes are
//! full overwrites, so the last writer wins.
//!
//! # Implementations
//!
//! - `FileKeyValueStore` (in `event-booking` crate): one file per key on local disk
//! - `InMemoryKeyValueStore` (in `event-booking-testing` crate): fast, deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use event_booking_core::storage::{KeyValueStore, StorageError};
//!
//! fn example(store: &dyn KeyValueStore) -> Result<(), StorageError> {
//!     store.put("availableSlots", "10")?;
//!     assert_eq!(store.get("availableSlots")?.as_deref(), Some("10"));
//!     store.remove("availableSlots")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// Payloads are plain strings so the error stays `Clone` and can be carried
/// inside domain errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend refused the operation (closed, read-only, injected failure).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Durable string key-value store.
///
/// Implementations must be `Send + Sync`; they are shared through `Arc`
/// between the ledger environment and the effects it emits.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written durably.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_to_storage_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let error = StorageError::from(io);
        assert!(matches!(error, StorageError::Io(ref msg) if msg.contains("read-only")));
    }
}
