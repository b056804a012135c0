//! services/app/src/adapters/storage.rs
//!
//! This module contains the storage adapters, the concrete implementations
//! of the `KeyValueStore` port. The engine persists two JSON blobs through
//! this port: the in-progress form record and the saved-story gallery.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use storybook_core::ports::{KeyValueStore, PortError, PortResult};
use tokio::sync::RwLock;

//=========================================================================================
// FileStore
//=========================================================================================

/// A store that keeps one file per key under a storage directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates the storage directory if needed and returns the store.
    pub async fn create(dir: PathBuf) -> PortResult<Self> {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to create storage dir: {}", e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            // Removing an absent key is a no-op.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}

//=========================================================================================
// MemoryStore
//=========================================================================================

/// An in-memory store used by tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::create(dir.path().to_path_buf()).await.unwrap();

        store.put("form", r#"{"age":5}"#).await.unwrap();
        assert_eq!(
            store.get("form").await.unwrap(),
            Some(r#"{"age":5}"#.to_string())
        );

        store.remove("form").await.unwrap();
        assert_eq!(store.get("form").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_tolerates_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::create(dir.path().to_path_buf()).await.unwrap();

        assert_eq!(store.get("absent").await.unwrap(), None);
        store.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_round_trips_a_value() {
        let store = MemoryStore::new();

        store.put("gallery", "[]").await.unwrap();
        assert_eq!(store.get("gallery").await.unwrap(), Some("[]".to_string()));

        store.remove("gallery").await.unwrap();
        assert_eq!(store.get("gallery").await.unwrap(), None);
    }
}
