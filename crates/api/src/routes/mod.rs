//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Liveness banner
//! GET  /health                        - Health check
//! GET  /health/ready                  - Readiness check (database)
//!
//! # Users
//! POST /api/users                     - Register
//! POST /api/users/login               - Login
//! GET  /api/users/profile             - Own profile (bearer)
//! PUT  /api/users/profile             - Update own profile (bearer)
//!
//! # Products
//! GET  /api/products?keyword=&pageNumber= - Paginated listing
//! GET  /api/products/top              - Top rated
//! GET  /api/products/{id}             - Product detail
//! POST /api/products/{id}/reviews     - Add review (bearer)
//! ```

pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::OriginalUri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register))
        .route("/login", post(users::login))
        .route("/profile", get(users::profile).put(users::update_profile))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/top", get(products::top))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .fallback(not_found)
}

async fn api_root() -> &'static str {
    "API is running"
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("Not Found - {}", uri.path()))
}
