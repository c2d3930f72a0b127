//! User domain types.

use std::fmt;

use chrono::{DateTime, Utc};

use proshop_core::wire::UserProfile;
use proshop_core::{Email, UserId};

/// A stored account, hash included. Never serialized directly; see
/// [`User::profile`].
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.as_str().to_owned(),
            is_admin: self.is_admin,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The hash stays out of logs and Sentry payloads
        write!(
            f,
            "User {{ id: {}, email: {}, admin: {} }}",
            self.id, self.email, self.is_admin
        )
    }
}

/// Data needed to insert a user.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial update of a user. `None` keeps the stored value.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// Whether the update touches nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}
