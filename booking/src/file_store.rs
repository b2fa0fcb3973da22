//! File-backed key-value store.
//!
//! Each key lives in its own file, `<dir>/<key>.json`. Writes go to a
//! hidden temporary sibling, are synced, then renamed over the target so a
//! crash leaves either the old value or the new one, never a torn file.

use event_booking_core::storage::{KeyValueStore, StorageError};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Durable store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens (creating if needed) the store directory
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the key files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::Unavailable(format!(
                "key {key:?} is not a valid file name"
            )));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_get_remove() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(tmp.path().join("ledger")).unwrap();

        assert_eq!(store.get("bookings").unwrap(), None);

        store.put("bookings", "[]").unwrap();
        store.put("bookings", r#"[{"id":1,"name":"A","email":"a@x"}]"#).unwrap();
        assert_eq!(
            store.get("bookings").unwrap().as_deref(),
            Some(r#"[{"id":1,"name":"A","email":"a@x"}]"#)
        );
        assert!(store.dir().join("bookings.json").exists());
        assert!(!store.dir().join(".bookings.json.tmp").exists());

        store.remove("bookings").unwrap();
        store.remove("bookings").unwrap();
        assert_eq!(store.get("bookings").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        FileKeyValueStore::open(tmp.path())
            .unwrap()
            .put("availableSlots", "4")
            .unwrap();

        let reopened = FileKeyValueStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.get("availableSlots").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(tmp.path()).unwrap();

        assert!(store.put("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
