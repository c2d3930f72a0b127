//! Bearer token authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use proshop_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Verifies the `Authorization: Bearer <token>` header and loads the user the
/// token was issued for. Any failure rejects with `401` before the handler
/// runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug)]
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TokenSubject(user_id) = TokenSubject::from_request_parts(parts, state).await?;

        let user = state
            .db()
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".to_string()))?;

        set_sentry_user(user.id, user.email.as_str());

        Ok(Self(user))
    }
}

/// Extractor that only verifies the bearer token and yields its subject.
///
/// The account is not loaded, so a handler can tell a bad token (`401`)
/// apart from an account deleted after the token was issued.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject(pub UserId);

impl FromRequestParts<AppState> for TokenSubject {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let user_id = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Not authorized, token failed".to_string())
        })?;

        Ok(Self(user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
