//! Key-value blob stores.
//!
//! Values are opaque strings. The file-backed store keeps one file per key
//! and replaces it atomically, so a reader never sees a half-written value.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::StoreError;

/// A string-to-string store. Missing keys read as `None`; removing a
/// missing key is not an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: each key is a file named after it.
///
/// Keys are restricted to `[A-Za-z0-9_-]` so they can never escape the
/// directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_basic() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(&dir.path().join("cache")).unwrap();
        assert_eq!(store.dir(), dir.path().join("cache"));

        assert_eq!(store.get("prd_timestamp").unwrap(), None);
        store.set("prd_timestamp", "1700000000000").unwrap();
        store.set("prd_timestamp", "1700000000001").unwrap();
        assert_eq!(
            store.get("prd_timestamp").unwrap().as_deref(),
            Some("1700000000001")
        );

        store.remove("prd_timestamp").unwrap();
        assert_eq!(store.get("prd_timestamp").unwrap(), None);
        store.remove("prd_timestamp").unwrap();
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.set("k", "ñandú").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ñandú"));
    }

    #[test]
    fn file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        for key in ["", "../escape", "a/b", "a.b"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StoreError::InvalidKey(_))
            ));
        }
    }
}
