//! Authentication service.
//!
//! Password login, registration and profile updates. Tokens are issued by the
//! route handlers through [`TokenService`](crate::services::TokenService).

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use proshop_core::wire::UpdateProfileRequest;
use proshop_core::{Email, UserId};

use crate::db::{Database, RepositoryError};
use crate::models::{NewUser, User, UserChanges};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    db: &'a dyn Database,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Register a new user with name, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a blank name or short password,
    /// `AuthError::InvalidEmail` if the email format is invalid and
    /// `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = validate_name(name)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.db
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                is_admin: false,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// An unparseable email is reported the same way as a wrong password so
    /// the response does not reveal which part was wrong.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .db
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.db
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a profile update. Blank or absent fields keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account vanished,
    /// `AuthError::UserAlreadyExists` if the new email belongs to another
    /// user and `AuthError::Validation` / `AuthError::InvalidEmail` for bad
    /// input.
    pub async fn update_profile(&self, user: &User, request: UpdateProfileRequest) -> Result<User, AuthError> {
        let mut changes = UserChanges::default();

        if let Some(name) = present(request.name) {
            changes.name = Some(name);
        }
        if let Some(email) = present(request.email) {
            changes.email = Some(Email::parse(&email)?);
        }
        if let Some(password) = request.password.filter(|p| !p.is_empty()) {
            validate_password(&password)?;
            changes.password_hash = Some(hash_password(&password)?);
        }

        if changes.is_empty() {
            return Ok(user.clone());
        }

        self.db
            .update_user(user.id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn validate_name(name: &str) -> Result<String, AuthError> {
    present(Some(name.to_owned())).ok_or_else(|| AuthError::Validation("Name is required".to_owned()))
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
