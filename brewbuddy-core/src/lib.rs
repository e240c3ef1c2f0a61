//! BrewBuddy Core Library
//!
//! The brew-journal data-synchronization and edit-state core: models, the
//! remote store contract with local implementations, the identity provider
//! contract, the snapshot cache, the journal controller, and the transient
//! view/edit state machine.

pub mod auth;
pub mod cache;
pub mod journal;
pub mod models;
pub mod session;
pub mod state;
pub mod store;

pub use auth::{
    AuthError, Identity, IdentityObserver, IdentityProvider, ListenerId, LocalAuth,
    MIN_PASSWORD_LEN,
};
pub use cache::{BrewCache, LoadState, LoadedCallback};
pub use journal::{JournalController, JournalError};
pub use models::{BrewEntry, UserProfile, ValidationError, RATING_MAX, RATING_MIN};
pub use session::Session;
pub use state::{EntryPanel, PanelState};
pub use store::{
    brews_path, Children, FileStore, JournalStore, MemoryStore, SnapshotObserver, StoreError,
    StoreEvent, SubscriptionHandle, BREWS_ROOT, USERS_ROOT,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
