//! ProShop REST API library.
//!
//! This crate provides the API as a library so the binary, the CLI and the
//! integration tests all build the same router and storage.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the complete application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let development = state.config().environment.is_development();

    let mut app = routes::routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers_middleware));

    // The SPA dev server runs on another origin
    if development {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
