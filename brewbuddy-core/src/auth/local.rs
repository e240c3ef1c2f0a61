//! Local identity provider backed by a JSON registry file.
//!
//! The registry keeps one record per account (keyed by lowercased email)
//! plus the uid of the currently signed-in session, so a CLI invocation
//! picks up the session left by the previous one. Passwords are stored as
//! salted SHA-256 digests.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{AuthError, Identity, IdentityObserver, IdentityProvider, ListenerId, MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    uid: String,
    email: String,
    salt: String,
    password_sha256: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registry {
    #[serde(default)]
    users: HashMap<String, UserRecord>,
    #[serde(default)]
    current_uid: Option<String>,
}

impl Registry {
    fn current_identity(&self) -> Option<Identity> {
        let uid = self.current_uid.as_deref()?;
        self.users.values().find(|r| r.uid == uid).map(|r| Identity {
            uid: r.uid.clone(),
            email: r.email.clone(),
        })
    }
}

struct Inner {
    registry: Registry,
    observers: HashMap<u64, IdentityObserver>,
    next_listener: u64,
}

/// File-backed identity provider.
pub struct LocalAuth {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl LocalAuth {
    /// Load the registry from `path`.
    ///
    /// A missing file starts an empty registry; a corrupt file is logged
    /// and replaced with an empty one on the next successful write.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let registry = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(registry) => registry,
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", path.display(), e);
                    Registry::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("no auth registry at {}, starting empty", path.display());
                Registry::default()
            }
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                Registry::default()
            }
        };
        Self {
            path,
            inner: Mutex::new(Inner {
                registry,
                observers: HashMap::new(),
                next_listener: 0,
            }),
        }
    }

    fn persist(&self, registry: &Registry) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(registry)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, raw).map_err(|e| AuthError::Storage(e.to_string()))
    }

    /// Invoke every observer with the new auth state, outside the lock.
    fn notify(&self, identity: Option<Identity>) {
        let observers: Vec<IdentityObserver> = {
            let inner = self.inner.lock().unwrap();
            inner.observers.values().cloned().collect()
        };
        for observer in observers {
            observer(identity.clone());
        }
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl IdentityProvider for LocalAuth {
    fn current_identity(&self) -> Option<Identity> {
        self.inner.lock().unwrap().registry.current_identity()
    }

    fn on_identity_changed(&self, observer: IdentityObserver) -> ListenerId {
        let (id, current) = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.observers.insert(id, observer.clone());
            (id, inner.registry.current_identity())
        };
        observer(current);
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.lock().unwrap().observers.remove(&id.0);
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let identity = {
            let mut inner = self.inner.lock().unwrap();
            if inner.registry.users.contains_key(&email) {
                return Err(AuthError::EmailAlreadyRegistered(email));
            }
            let salt = Uuid::new_v4().simple().to_string();
            let record = UserRecord {
                uid: Uuid::new_v4().to_string(),
                email: email.clone(),
                password_sha256: password_digest(&salt, password),
                salt,
                created_at: Utc::now(),
            };
            let identity = Identity {
                uid: record.uid.clone(),
                email: record.email.clone(),
            };
            let prior_uid = inner.registry.current_uid.clone();
            inner.registry.users.insert(email.clone(), record);
            inner.registry.current_uid = Some(identity.uid.clone());
            // a failed persist must leave no trace of the new account
            if let Err(e) = self.persist(&inner.registry) {
                inner.registry.users.remove(&email);
                inner.registry.current_uid = prior_uid;
                return Err(e);
            }
            identity
        };

        self.notify(Some(identity.clone()));
        Ok(identity)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;

        let identity = {
            let mut inner = self.inner.lock().unwrap();
            let record = inner
                .registry
                .users
                .get(&email)
                .ok_or(AuthError::InvalidCredentials)?;
            if password_digest(&record.salt, password) != record.password_sha256 {
                return Err(AuthError::InvalidCredentials);
            }
            let identity = Identity {
                uid: record.uid.clone(),
                email: record.email.clone(),
            };
            let prior_uid = inner.registry.current_uid.replace(identity.uid.clone());
            if let Err(e) = self.persist(&inner.registry) {
                inner.registry.current_uid = prior_uid;
                return Err(e);
            }
            identity
        };

        self.notify(Some(identity.clone()));
        Ok(identity)
    }

    fn logout(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.registry.current_uid = None;
            if let Err(e) = self.persist(&inner.registry) {
                tracing::warn!("failed to persist logout: {}", e);
            }
        }
        self.notify(None);
    }
}
