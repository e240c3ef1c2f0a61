//! Journal controller: the single mediator between caller intents and the
//! remote store.
//!
//! Reads go through the cache mirror; writes go straight to the store and
//! become visible only when the next snapshot lands. The controller never
//! touches the cache list itself - there is no optimistic insert, so a
//! write's effect is always the store's word, not ours.

use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{BrewCache, LoadState, LoadedCallback};
use crate::models::{BrewEntry, ValidationError};
use crate::store::{brews_path, JournalStore, StoreError};

/// Errors raised by journal operations.
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("invalid brew: {0}")]
    Validation(#[from] ValidationError),

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("cannot update a brew that was never persisted")]
    NeverPersisted,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Mediates between UI-facing intents and the remote store for one user at
/// a time.
pub struct JournalController<S: JournalStore> {
    store: Arc<S>,
    cache: BrewCache,
    uid: Option<String>,
}

impl<S: JournalStore + 'static> JournalController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cache: BrewCache::new(),
            uid: None,
        }
    }

    /// Bind the cache to `uid`'s collection. Must be called again whenever
    /// the active identity changes; rebinding drops the previous user's
    /// entries before the new collection's first snapshot arrives.
    pub fn load_entries(&mut self, uid: &str) {
        self.load_entries_with(uid, None);
    }

    /// `load_entries` with a one-shot per-snapshot signal for callers that
    /// need to know when data has landed.
    pub fn load_entries_with(&mut self, uid: &str, on_loaded: Option<LoadedCallback>) {
        self.cache.bind(&self.store, uid, on_loaded);
        self.uid = Some(uid.to_string());
    }

    /// Unbind the cache, e.g. when the identity becomes null.
    pub fn unbind(&mut self) {
        self.cache.unbind();
        self.uid = None;
    }

    pub fn active_uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn load_state(&self) -> LoadState {
        self.cache.state()
    }

    /// Read view over the cache: rating descending, ties kept in snapshot
    /// order. A pure function of the current cache contents.
    pub fn entries_sorted(&self) -> Vec<BrewEntry> {
        let mut entries = self.cache.entries();
        entries.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
        entries
    }

    /// Validate and create a new entry under the active user.
    ///
    /// Returns the store-assigned key; the entry appears in the cache only
    /// with the next snapshot. Calls are not de-duplicated: issuing the same
    /// create twice produces two entries.
    pub async fn create(&self, draft: &BrewEntry) -> Result<String, JournalError> {
        draft.validate()?;
        let uid = self.uid.as_deref().ok_or(JournalError::NotSignedIn)?;
        let value = serde_json::to_value(draft).map_err(StoreError::Encode)?;
        let key = self.store.push_create(&brews_path(uid), value).await?;
        Ok(key)
    }

    /// Validate and overwrite the entry at its assigned key.
    ///
    /// An entry without a key was never persisted; updating it is a caller
    /// bug and is reported as `NeverPersisted` rather than silently creating
    /// a document.
    pub async fn update(&self, entry: &BrewEntry) -> Result<(), JournalError> {
        entry.validate()?;
        let key = entry.key.as_deref().ok_or(JournalError::NeverPersisted)?;
        let uid = self.uid.as_deref().ok_or(JournalError::NotSignedIn)?;
        let value = serde_json::to_value(entry).map_err(StoreError::Encode)?;
        self.store.set_at_key(&brews_path(uid), key, value).await?;
        Ok(())
    }

    /// Delete the entry at `key`. Destructive intent is expected to be
    /// confirmed upstream; there is no undo here.
    pub async fn delete(&self, key: &str) -> Result<(), JournalError> {
        let uid = self.uid.as_deref().ok_or(JournalError::NotSignedIn)?;
        self.store.delete_at_key(&brews_path(uid), key).await?;
        Ok(())
    }
}
