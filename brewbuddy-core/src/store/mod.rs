//! Remote journal store contract.
//!
//! The store is a key-addressed document tree: every `path` holds an ordered
//! collection of `(key, value)` children. Subscribers receive the full
//! current snapshot of a path on subscribe and again after every mutation of
//! that path - there is no incremental diffing at this boundary.
//!
//! Subscription failures are delivered on the same channel as snapshots
//! (`StoreEvent::SubscriptionError`) so a caller can always tell an empty
//! collection apart from a broken subscription.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Root path for per-user brew collections.
pub const BREWS_ROOT: &str = "brews";
/// Root path for user profile documents.
pub const USERS_ROOT: &str = "users";

/// Collection path holding one user's brews.
pub fn brews_path(uid: &str) -> String {
    format!("{BREWS_ROOT}/{uid}")
}

/// Ordered children of one path: `(key, raw value)` pairs in store order.
pub type Children = Vec<(String, Value)>;

/// Events delivered to a subscription observer.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The full current snapshot of the subscribed path.
    Snapshot(Children),
    /// The subscription failed; no further snapshots will arrive until the
    /// caller resubscribes.
    SubscriptionError(String),
}

/// Callback invoked for every event on a subscribed path.
pub type SnapshotObserver = Arc<dyn Fn(StoreEvent) + Send + Sync>;

/// Opaque handle identifying one active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub(crate) u64);

/// Errors raised by store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode store document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(String),
}

/// The remote journal store collaborator.
///
/// Write operations complete asynchronously and may be awaited or dispatched
/// fire-and-forget; either way the authoritative result of a write is only
/// observable through the next snapshot delivered to subscribers.
#[allow(async_fn_in_trait)]
pub trait JournalStore: Send + Sync {
    /// Subscribe to a path. The observer is invoked immediately with the
    /// current snapshot, then once per subsequent mutation of the path, in
    /// mutation order.
    fn subscribe(&self, path: &str, observer: SnapshotObserver) -> SubscriptionHandle;

    /// Stop snapshot delivery for a handle. Unknown or already-removed
    /// handles are ignored, so double unsubscription is a no-op. In-flight
    /// writes are not cancelled.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// One-shot read of a single child, used for profile lookups.
    fn value_at(&self, path: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Create a child under `path` with a store-generated key.
    async fn push_create(&self, path: &str, value: Value) -> Result<String, StoreError>;

    /// Overwrite (or create) the child at `key`.
    async fn set_at_key(&self, path: &str, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove the child at `key`. Removing an absent key is a no-op.
    async fn delete_at_key(&self, path: &str, key: &str) -> Result<(), StoreError>;
}
