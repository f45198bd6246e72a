//! Snapshot persistence backends
//!
//! The history store persists one serialized snapshot under a fixed key.
//! [`SledSnapshotStore`] keeps it in an embedded `sled` database;
//! [`MemorySnapshotStore`] keeps it in process memory for tests and
//! ephemeral sessions.

use crate::error::{MicrofavolaError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value storage for serialized snapshots
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Snapshot store backed by an embedded `sled` database
#[derive(Clone)]
pub struct SledSnapshotStore {
    db: sled::Db,
}

impl SledSnapshotStore {
    /// Open or create a store at `path` (a directory)
    ///
    /// # Errors
    ///
    /// Returns `MicrofavolaError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use microfavola::history::SledSnapshotStore;
    ///
    /// # fn main() -> microfavola::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledSnapshotStore::open(dir.path().join("history"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MicrofavolaError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| MicrofavolaError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened history database at {}", path.display());
        Ok(Self { db })
    }

    /// Open the store in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns `MicrofavolaError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }
}

/// Default location of the history database
pub fn default_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "microfavola", "microfavola").ok_or_else(|| {
        MicrofavolaError::Storage("Could not determine data directory".to_string())
    })?;
    Ok(proj_dirs.data_dir().join("history"))
}

impl SnapshotStore for SledSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| MicrofavolaError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| MicrofavolaError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| MicrofavolaError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| MicrofavolaError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| MicrofavolaError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// In-memory snapshot store
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.values.lock().map_err(|_| {
            MicrofavolaError::Storage("Memory store lock poisoned".to_string()).into()
        })
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_write_read_remove() {
        let store = MemorySnapshotStore::new();
        assert!(store.read("k").unwrap().is_none());

        store.write("k", b"value").unwrap();
        assert_eq!(store.read("k").unwrap(), Some(b"value".to_vec()));

        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_sled_store_write_read_remove() {
        let tmp = TempDir::new().unwrap();
        let store = SledSnapshotStore::open(tmp.path().join("db")).unwrap();

        assert!(store.read("k").unwrap().is_none());
        store.write("k", b"[1,2,3]").unwrap();
        assert_eq!(store.read("k").unwrap(), Some(b"[1,2,3]".to_vec()));

        store.write("k", b"[]").unwrap();
        assert_eq!(store.read("k").unwrap(), Some(b"[]".to_vec()));

        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn test_sled_store_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("deeper").join("db");
        let store = SledSnapshotStore::open(&path).unwrap();
        store.write("k", b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_sled_store_clones_share_data() {
        let tmp = TempDir::new().unwrap();
        let store = SledSnapshotStore::open(tmp.path().join("db")).unwrap();
        let other = store.clone();
        store.write("k", b"shared").unwrap();
        assert_eq!(other.read("k").unwrap(), Some(b"shared".to_vec()));
    }
}
