use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile document written to `users/{uid}` once at registration.
///
/// The journal core only ever reads it back; account changes are the
/// identity provider's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}
