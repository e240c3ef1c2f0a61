//! Auth session state: who is signed in, their profile, and the last auth
//! error.
//!
//! The session registers an identity observer on construction and mirrors
//! the provider's state from then on. Register and login are awaited round
//! trips; everything the success path needs (profile load, error clearing)
//! happens through the observer so that session restore behaves exactly
//! like a fresh login.

use std::sync::{Arc, Mutex};

use crate::auth::{AuthError, Identity, IdentityObserver, IdentityProvider, ListenerId};
use crate::models::UserProfile;
use crate::store::{JournalStore, USERS_ROOT};

/// Signed-in state mirrored from an identity provider, plus the profile
/// document loaded from `users/{uid}`.
pub struct Session<S, A>
where
    S: JournalStore + 'static,
    A: IdentityProvider,
{
    auth: Arc<A>,
    store: Arc<S>,
    identity: Arc<Mutex<Option<Identity>>>,
    profile: Arc<Mutex<Option<UserProfile>>>,
    auth_error: Arc<Mutex<Option<String>>>,
    listener: ListenerId,
}

impl<S, A> Session<S, A>
where
    S: JournalStore + 'static,
    A: IdentityProvider,
{
    pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
        let identity = Arc::new(Mutex::new(None));
        let profile = Arc::new(Mutex::new(None));
        let auth_error = Arc::new(Mutex::new(None));

        let observer: IdentityObserver = {
            let identity = Arc::clone(&identity);
            let profile = Arc::clone(&profile);
            let auth_error = Arc::clone(&auth_error);
            let store = Arc::clone(&store);
            Arc::new(move |current: Option<Identity>| match current {
                Some(current) => {
                    *profile.lock().unwrap() = load_profile(&*store, &current.uid, &auth_error);
                    *identity.lock().unwrap() = Some(current);
                }
                None => {
                    *identity.lock().unwrap() = None;
                    *profile.lock().unwrap() = None;
                    *auth_error.lock().unwrap() = None;
                }
            })
        };
        let listener = auth.on_identity_changed(observer);

        Self {
            auth,
            store,
            identity,
            profile,
            auth_error,
            listener,
        }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.lock().unwrap().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.lock().unwrap().clone()
    }

    /// Message of the last failed auth operation, cleared on sign-out and
    /// at the start of each new attempt.
    pub fn auth_error(&self) -> Option<String> {
        self.auth_error.lock().unwrap().clone()
    }

    /// Register a new account, sign it in, and write the profile document.
    ///
    /// The profile is written exactly once here; a failure to write it does
    /// not undo the registration and is reported through `auth_error`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.set_auth_error(None);
        match self.auth.register(email, password).await {
            Ok(current) => {
                let profile = UserProfile::new(username, &current.email);
                match serde_json::to_value(&profile) {
                    Ok(value) => {
                        if let Err(e) = self.store.set_at_key(USERS_ROOT, &current.uid, value).await
                        {
                            tracing::warn!("failed to write profile for {}: {}", current.uid, e);
                            self.set_auth_error(Some(format!("Failed to save profile: {e}")));
                        } else {
                            *self.profile.lock().unwrap() = Some(profile);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("failed to encode profile for {}: {}", current.uid, e)
                    }
                }
                Ok(current)
            }
            Err(e) => {
                self.set_auth_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Sign in an existing account. On success the identity observer loads
    /// the profile; on failure the message lands in `auth_error`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.set_auth_error(None);
        match self.auth.login(email, password).await {
            Ok(current) => Ok(current),
            Err(e) => {
                self.set_auth_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Sign out. The identity observer clears identity, profile and error.
    pub fn logout(&self) {
        self.auth.logout();
    }

    fn set_auth_error(&self, message: Option<String>) {
        *self.auth_error.lock().unwrap() = message;
    }
}

impl<S, A> Drop for Session<S, A>
where
    S: JournalStore + 'static,
    A: IdentityProvider,
{
    fn drop(&mut self) {
        self.auth.remove_listener(self.listener);
    }
}

/// One-shot read of `users/{uid}`. Read failures surface through the auth
/// error channel; a malformed profile document is skipped with a warning.
fn load_profile<S: JournalStore>(
    store: &S,
    uid: &str,
    auth_error: &Mutex<Option<String>>,
) -> Option<UserProfile> {
    match store.value_at(USERS_ROOT, uid) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("malformed profile document for {}: {}", uid, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            *auth_error.lock().unwrap() = Some(format!("Failed to load profile: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuth;
    use crate::store::{MemoryStore, SnapshotObserver, StoreError, SubscriptionHandle};
    use serde_json::Value;
    use std::io::ErrorKind;
    use tempfile::tempdir;

    /// Store double that rejects every write.
    struct ReadOnlyStore;

    impl JournalStore for ReadOnlyStore {
        fn subscribe(&self, _path: &str, _observer: SnapshotObserver) -> SubscriptionHandle {
            SubscriptionHandle(0)
        }

        fn unsubscribe(&self, _handle: SubscriptionHandle) {}

        fn value_at(&self, _path: &str, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn push_create(&self, _path: &str, _value: Value) -> Result<String, StoreError> {
            Err(StoreError::Io(ErrorKind::PermissionDenied.into()))
        }

        async fn set_at_key(&self, _path: &str, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Io(ErrorKind::PermissionDenied.into()))
        }

        async fn delete_at_key(&self, _path: &str, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(ErrorKind::PermissionDenied.into()))
        }
    }

    fn session_in(
        dir: &tempfile::TempDir,
    ) -> (Session<MemoryStore, LocalAuth>, Arc<MemoryStore>, Arc<LocalAuth>) {
        let auth = Arc::new(LocalAuth::load(dir.path().join("auth.json")));
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(Arc::clone(&auth), Arc::clone(&store));
        (session, store, auth)
    }

    #[tokio::test]
    async fn test_register_writes_profile_document() {
        let dir = tempdir().unwrap();
        let (session, store, _auth) = session_in(&dir);

        let identity = session
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        let value = store.value_at(USERS_ROOT, &identity.uid).unwrap().unwrap();
        assert_eq!(value.get("username").unwrap(), "alice");
        assert_eq!(value.get("email").unwrap(), "alice@example.com");
        assert_eq!(session.profile().map(|p| p.username), Some("alice".into()));
    }

    #[tokio::test]
    async fn test_login_mirrors_identity_and_profile() {
        let dir = tempdir().unwrap();
        let (session, _store, _auth) = session_in(&dir);

        session
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();
        session.logout();
        assert_eq!(session.current_identity(), None);
        assert_eq!(session.profile(), None);

        session.login("alice@example.com", "secret1").await.unwrap();
        assert!(session.current_identity().is_some());
        assert_eq!(session.profile().map(|p| p.username), Some("alice".into()));
    }

    #[tokio::test]
    async fn test_failed_login_surfaces_auth_error() {
        let dir = tempdir().unwrap();
        let (session, _store, _auth) = session_in(&dir);

        let err = session.login("nobody@example.com", "secret1").await;
        assert!(err.is_err());
        assert!(session.auth_error().is_some());
        assert_eq!(session.current_identity(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_state() {
        let dir = tempdir().unwrap();
        let (session, _store, _auth) = session_in(&dir);
        session
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        session.logout();
        assert_eq!(session.current_identity(), None);
        assert_eq!(session.profile(), None);
        assert_eq!(session.auth_error(), None);
    }

    #[tokio::test]
    async fn test_register_keeps_identity_when_profile_write_fails() {
        let dir = tempdir().unwrap();
        let auth = Arc::new(LocalAuth::load(dir.path().join("auth.json")));
        let session = Session::new(auth, Arc::new(ReadOnlyStore));

        let identity = session
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        // the registration stands; only the profile document is missing
        assert_eq!(session.current_identity(), Some(identity));
        assert_eq!(session.profile(), None);
        let error = session.auth_error().unwrap();
        assert!(error.contains("Failed to save profile"), "{error}");
    }

    #[tokio::test]
    async fn test_session_restore_picks_up_signed_in_user() {
        let dir = tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(LocalAuth::load(dir.path().join("auth.json")));

        let uid = {
            let session = Session::new(Arc::clone(&auth), Arc::clone(&store));
            session
                .register("alice", "alice@example.com", "secret1")
                .await
                .unwrap()
                .uid
        };

        // a fresh session over the same provider sees the restored identity
        let session = Session::new(Arc::clone(&auth), Arc::clone(&store));
        assert_eq!(session.current_identity().map(|i| i.uid), Some(uid));
        assert_eq!(session.profile().map(|p| p.username), Some("alice".into()));
    }
}
