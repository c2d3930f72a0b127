//! Login email addresses.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why an address was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email cannot contain whitespace")]
    Whitespace,
    #[error("email must look like name@domain.tld")]
    Malformed,
}

/// A trimmed, lowercased email address.
///
/// Uniqueness of accounts is decided on this form, so `Jane@Example.com`
/// and ` jane@example.com` are the same user.
///
/// ```
/// use proshop_core::Email;
///
/// let email: Email = "  John@Example.com ".parse().unwrap();
/// assert_eq!(email.as_str(), "john@example.com");
/// assert!(Email::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// # Errors
    ///
    /// Returns the first [`EmailError`] the input trips over.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let candidate = raw.trim();
        match candidate.len() {
            0 => return Err(EmailError::Empty),
            n if n > Self::MAX_LENGTH => return Err(EmailError::TooLong),
            _ => {}
        }
        if candidate.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }
        if !has_mailbox_shape(candidate) {
            return Err(EmailError::Malformed);
        }
        Ok(Self(candidate.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// One `@`, something before it, and a dotted domain after it.
fn has_mailbox_shape(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
