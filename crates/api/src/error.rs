//! Handler errors and their `{"message": "..."}` responses.
//!
//! Server-side failures are reported to Sentry and answered with a generic
//! message; client mistakes are answered verbatim.

use std::borrow::Cow;
use std::fmt;

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use proshop_core::wire::Message;

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError};

/// Every way a handler can fail.
///
/// The `Display` form is for logs. Clients only ever see [`AppError::reply`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("repository: {0}")]
    Database(#[from] RepositoryError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

const INTERNAL: &str = "Internal server error";

impl AppError {
    /// Status code and client-safe message.
    fn reply(&self) -> (StatusCode, Cow<'_, str>) {
        use StatusCode as S;

        match self {
            Self::NotFound(msg) => (S::NOT_FOUND, msg.into()),
            Self::Unauthorized(msg) => (S::UNAUTHORIZED, msg.into()),
            Self::BadRequest(msg) => (S::BAD_REQUEST, msg.into()),

            Self::Auth(AuthError::InvalidCredentials) => (S::UNAUTHORIZED, "Invalid email or password".into()),
            Self::Auth(AuthError::UserNotFound) => (S::NOT_FOUND, "User not found".into()),
            Self::Auth(AuthError::UserAlreadyExists) => (S::BAD_REQUEST, "User already exists".into()),
            Self::Auth(AuthError::InvalidEmail(_)) => (S::BAD_REQUEST, "Invalid email address".into()),
            Self::Auth(AuthError::Validation(msg)) => (S::BAD_REQUEST, msg.into()),

            Self::Catalog(CatalogError::ProductNotFound) => (S::NOT_FOUND, "Product not found".into()),
            Self::Catalog(CatalogError::AlreadyReviewed) => (S::BAD_REQUEST, "Product already reviewed".into()),
            Self::Catalog(CatalogError::InvalidRating(e)) => (S::BAD_REQUEST, e.to_string().into()),
            Self::Catalog(CatalogError::EmptyComment) => (S::BAD_REQUEST, "Comment is required".into()),

            Self::Database(_)
            | Self::Auth(AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_))
            | Self::Catalog(CatalogError::Repository(_)) => (S::INTERNAL_SERVER_ERROR, INTERNAL.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.reply();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        } else {
            tracing::debug!(%status, error = %self, "Request rejected");
        }

        (status, Json(Message::new(message.into_owned()))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejection is an [`AppError`], so malformed bodies
/// get the same `{"message"}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attribute later Sentry events on this request to the signed-in user.
pub fn set_sentry_user(user_id: impl fmt::Display, email: &str) {
    let user = sentry::User {
        id: Some(user_id.to_string()),
        email: Some(email.to_owned()),
        ..Default::default()
    };
    sentry::configure_scope(|scope| scope.set_user(Some(user)));
}
