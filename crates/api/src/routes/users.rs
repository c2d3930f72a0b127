//! User account route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use proshop_core::wire::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserInfo, UserProfile};

use crate::error::{AppJson, Result, set_sentry_user};
use crate::middleware::{RequireAuth, TokenSubject};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

fn user_info(state: &AppState, user: &User) -> Result<UserInfo> {
    let token = state
        .tokens()
        .issue(user.id)
        .map_err(crate::services::AuthError::from)?;
    Ok(UserInfo::new(user.profile(), token))
}

/// Exchange email and password for a bearer token.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<UserInfo>> {
    let user = AuthService::new(state.db())
        .login(&request.email, &request.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(user_info(&state, &user)?))
}

/// Create an account and log it in.
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    let user = AuthService::new(state.db())
        .register(&request.name, &request.email, &request.password)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user_info(&state, &user)?)))
}

/// The authenticated user's profile.
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<UserProfile> {
    Json(user.profile())
}

/// Update the authenticated user's profile and re-issue their token.
///
/// A valid token whose account is gone answers `404 User not found`.
#[instrument(skip(state, user_id, request), fields(user_id = %user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    TokenSubject(user_id): TokenSubject,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserInfo>> {
    let auth = AuthService::new(state.db());
    let user = auth.get_user(user_id).await?;
    set_sentry_user(user.id, user.email.as_str());

    let updated = auth.update_profile(&user, request).await?;

    tracing::info!("Profile updated");
    Ok(Json(user_info(&state, &updated)?))
}
