//! Identity provider contract.
//!
//! The journal core treats authentication as an external collaborator: it
//! needs the current identity, a way to observe identity changes, and the
//! register/login/logout round trips. `LocalAuth` implements the contract
//! against a local registry file.

mod local;

pub use local::LocalAuth;

use std::sync::Arc;
use thiserror::Error;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in identity. The `uid` is the stable namespace for that user's
/// journal data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Callback invoked with the identity active after each auth state change.
pub type IdentityObserver = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Opaque handle identifying one registered identity observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Errors raised by authentication operations.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("an account already exists for {0}")]
    EmailAlreadyRegistered(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("auth storage error: {0}")]
    Storage(String),
}

/// The identity provider collaborator.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider: Send + Sync {
    /// Identity of the signed-in user, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Register an observer for auth state changes. The observer fires
    /// immediately with the current state, then on every change, until
    /// removed.
    fn on_identity_changed(&self, observer: IdentityObserver) -> ListenerId;

    /// Remove a previously registered observer. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Create an account and sign it in.
    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Sign in an existing account.
    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Sign out. Observers are notified with `None`.
    fn logout(&self);
}
