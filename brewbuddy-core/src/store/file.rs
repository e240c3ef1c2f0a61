//! File-backed journal store.
//!
//! Keeps the whole document tree in memory and writes it to a single JSON
//! file after every mutation. On open the file is loaded back, so one
//! process sees its previous writes. A missing file starts an empty store;
//! a file that fails to parse is reported rather than silently replaced.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{
    Children, JournalStore, MemoryStore, SnapshotObserver, StoreError, SubscriptionHandle,
};

/// Journal store persisted to a single JSON document.
pub struct FileStore {
    store: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, loading any existing contents.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let contents: BTreeMap<String, Children> = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("no store file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(Self {
            store: MemoryStore::with_contents(contents),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current tree to disk. Subscribers have already seen the
    /// mutation by the time this runs; a persist failure leaves the on-disk
    /// copy stale and is returned to the writer.
    fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.store.contents())?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl JournalStore for FileStore {
    fn subscribe(&self, path: &str, observer: SnapshotObserver) -> SubscriptionHandle {
        self.store.subscribe(path, observer)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.store.unsubscribe(handle)
    }

    fn value_at(&self, path: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.store.value_at(path, key)
    }

    async fn push_create(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let key = self.store.push_create(path, value).await?;
        self.persist()?;
        Ok(key)
    }

    async fn set_at_key(&self, path: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.store.set_at_key(path, key, value).await?;
        self.persist()
    }

    async fn delete_at_key(&self, path: &str, key: &str) -> Result<(), StoreError> {
        self.store.delete_at_key(path, key).await?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");

        let key = {
            let store = FileStore::open(&path).unwrap();
            store
                .push_create("brews/u1", json!({"name": "Ethiopia", "rating": 4.5}))
                .await
                .unwrap()
        };

        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.value_at("brews/u1", &key).unwrap(),
            Some(json!({"name": "Ethiopia", "rating": 4.5}))
        );
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.value_at("brews/u1", "k").unwrap().is_none());
    }

    #[test]
    fn test_open_corrupt_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");
        std::fs::write(&path, "not json at all").unwrap();

        match FileStore::open(&path) {
            Err(StoreError::Corrupt(_)) => {}
            other => panic!("expected corrupt error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");

        let key = {
            let store = FileStore::open(&path).unwrap();
            let key = store.push_create("p", json!(1)).await.unwrap();
            store.delete_at_key("p", &key).await.unwrap();
            key
        };

        let store = FileStore::open(&path).unwrap();
        assert!(store.value_at("p", &key).unwrap().is_none());
    }
}
