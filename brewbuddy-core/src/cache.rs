//! In-memory mirror of one user's remote brew collection.
//!
//! The cache is updated exclusively by snapshot events from the store
//! subscription: every snapshot wholesale-replaces the decoded entry list.
//! That full replace is deliberate - the mirror can never drift from the
//! store's view, at the cost of rebuilding dependents on every change.

use std::sync::{Arc, Mutex};

use crate::models::BrewEntry;
use crate::store::{brews_path, JournalStore, SnapshotObserver, StoreEvent};

/// Callback fired once per delivered snapshot, for one-shot load signals.
pub type LoadedCallback = Arc<dyn Fn() + Send + Sync>;

/// Where the cache stands relative to the remote collection.
///
/// An empty entry list is only reported through `Loaded`, so "no brews yet"
/// is always distinguishable from "not bound", "still waiting", and "the
/// subscription failed".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Not bound to any collection.
    NotLoaded,
    /// Bound, waiting for the first snapshot.
    Loading,
    /// Mirroring the last snapshot delivered by the store.
    Loaded(Vec<BrewEntry>),
    /// The subscription reported an error; entries are gone until rebind.
    Failed(String),
}

/// Mirror of `brews/{uid}` for the bound user.
///
/// The cache owns the cancellation of its subscription: it remembers the
/// store it subscribed against, so rebinding to a different store instance
/// still tears down the old subscription rather than stranding it.
pub struct BrewCache {
    state: Arc<Mutex<LoadState>>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
    bound_uid: Option<String>,
}

impl BrewCache {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LoadState::NotLoaded)),
            cancel: None,
            bound_uid: None,
        }
    }

    /// Bind the cache to `brews/{uid}`.
    ///
    /// Any previous subscription is removed first and the old entries are
    /// dropped before the new collection's first snapshot arrives, so
    /// entries for different users never intermix. Children that fail to
    /// decode are skipped rather than aborting the snapshot.
    pub fn bind<S: JournalStore + 'static>(
        &mut self,
        store: &Arc<S>,
        uid: &str,
        on_loaded: Option<LoadedCallback>,
    ) {
        self.unbind();
        *self.state.lock().unwrap() = LoadState::Loading;

        let state = Arc::clone(&self.state);
        let observer: SnapshotObserver = Arc::new(move |event| match event {
            StoreEvent::Snapshot(children) => {
                let mut entries = Vec::with_capacity(children.len());
                for (key, value) in children {
                    match BrewEntry::from_snapshot(&key, value) {
                        Ok(entry) => entries.push(entry),
                        Err(e) => {
                            tracing::warn!("skipping brew {} that failed to decode: {}", key, e)
                        }
                    }
                }
                *state.lock().unwrap() = LoadState::Loaded(entries);
                if let Some(cb) = &on_loaded {
                    cb();
                }
            }
            StoreEvent::SubscriptionError(reason) => {
                tracing::warn!("brew subscription failed: {}", reason);
                *state.lock().unwrap() = LoadState::Failed(reason);
            }
        });

        let handle = store.subscribe(&brews_path(uid), observer);
        let store = Arc::clone(store);
        self.cancel = Some(Box::new(move || store.unsubscribe(handle)));
        self.bound_uid = Some(uid.to_string());
    }

    /// Drop the subscription and clear the mirror. Safe to call when never
    /// bound; calling it twice is a no-op.
    pub fn unbind(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        self.bound_uid = None;
        *self.state.lock().unwrap() = LoadState::NotLoaded;
    }

    /// Uid of the collection currently bound, if any.
    pub fn bound_uid(&self) -> Option<&str> {
        self.bound_uid.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state.lock().unwrap().clone()
    }

    /// Entries of the last snapshot, empty unless `Loaded`.
    pub fn entries(&self) -> Vec<BrewEntry> {
        match &*self.state.lock().unwrap() {
            LoadState::Loaded(entries) => entries.clone(),
            _ => Vec::new(),
        }
    }
}

impl Default for BrewCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BrewCache {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
