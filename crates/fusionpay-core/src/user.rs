//! Users that can sign in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::UserId;

/// A stored user. The password is kept only as an argon2 PHC string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub user_id: UserId,

    /// Unique username (admins use their email).
    pub username: String,

    /// Argon2 password hash in PHC format.
    pub password_hash: String,

    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from an already hashed password.
    #[must_use]
    pub fn new(username: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id: UserId::generate(),
            username,
            password_hash,
            created_at: now,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
