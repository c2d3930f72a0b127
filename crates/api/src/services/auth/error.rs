//! Failures of the account operations.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed email: {0}")]
    InvalidEmail(#[from] proshop_core::EmailError),

    /// Unknown email and wrong password look the same to the caller.
    #[error("email/password mismatch")]
    InvalidCredentials,

    #[error("no such user")]
    UserNotFound,

    #[error("email already registered")]
    UserAlreadyExists,

    /// Rejected before touching storage; the text is shown to the client.
    #[error("rejected input: {0}")]
    Validation(String),

    #[error("argon2 hashing failed")]
    PasswordHash,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
