//! In-memory journal store.
//!
//! Backs the unit tests and the file-backed store. Each path keeps its
//! children in insertion order, which is also the order snapshots present
//! them in.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use uuid::Uuid;

use super::{
    Children, JournalStore, SnapshotObserver, StoreError, StoreEvent, SubscriptionHandle,
};

struct Subscriber {
    path: String,
    observer: SnapshotObserver,
}

#[derive(Default)]
struct Inner {
    trees: BTreeMap<String, Children>,
    subscribers: HashMap<u64, Subscriber>,
    next_handle: u64,
}

/// In-memory key-addressed document tree with snapshot fan-out.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_contents(BTreeMap::new())
    }

    /// Build a store seeded with existing contents.
    pub fn with_contents(contents: BTreeMap<String, Children>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                trees: contents,
                subscribers: HashMap::new(),
                next_handle: 0,
            }),
        }
    }

    /// Copy of the whole tree, used by persistent wrappers.
    pub fn contents(&self) -> BTreeMap<String, Children> {
        self.inner.lock().unwrap().trees.clone()
    }

    /// Deliver the current snapshot of `path` to every subscriber of that
    /// path. Observers run outside the lock so they may call back into the
    /// store.
    fn notify(&self, path: &str) {
        let batch: Vec<(SnapshotObserver, Children)> = {
            let inner = self.inner.lock().unwrap();
            let snapshot = inner.trees.get(path).cloned().unwrap_or_default();
            inner
                .subscribers
                .values()
                .filter(|s| s.path == path)
                .map(|s| (Arc::clone(&s.observer), snapshot.clone()))
                .collect()
        };
        for (observer, snapshot) in batch {
            observer(StoreEvent::Snapshot(snapshot));
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalStore for MemoryStore {
    fn subscribe(&self, path: &str, observer: SnapshotObserver) -> SubscriptionHandle {
        let (handle, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            let handle = inner.next_handle;
            inner.next_handle += 1;
            inner.subscribers.insert(
                handle,
                Subscriber {
                    path: path.to_string(),
                    observer: Arc::clone(&observer),
                },
            );
            (handle, inner.trees.get(path).cloned().unwrap_or_default())
        };
        observer(StoreEvent::Snapshot(snapshot));
        SubscriptionHandle(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.inner.lock().unwrap().subscribers.remove(&handle.0);
    }

    fn value_at(&self, path: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.trees.get(path).and_then(|children| {
            children
                .iter()
                .find(|(k, _)| k.as_str() == key)
                .map(|(_, v)| v.clone())
        }))
    }

    async fn push_create(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .trees
                .entry(path.to_string())
                .or_default()
                .push((key.clone(), value));
        }
        self.notify(path);
        Ok(key)
    }

    async fn set_at_key(&self, path: &str, key: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().unwrap();
            let children = inner.trees.entry(path.to_string()).or_default();
            match children.iter_mut().find(|(k, _)| k.as_str() == key) {
                Some(slot) => slot.1 = value,
                // Setting an unknown key creates the child, matching the
                // remote store's set-at-key semantics.
                None => children.push((key.to_string(), value)),
            }
        }
        self.notify(path);
        Ok(())
    }

    async fn delete_at_key(&self, path: &str, key: &str) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(children) = inner.trees.get_mut(path) {
                children.retain(|(k, _)| k.as_str() != key);
            }
        }
        self.notify(path);
        Ok(())
    }
}
