//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use proshop_core::ProductId;
use proshop_core::wire::{CreateReviewRequest, Message, Product, ProductListQuery, ProductPage};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::models::ProductQuery;
use crate::services::{CatalogError, CatalogService};
use crate::state::AppState;

/// Path IDs that don't parse can't name a product.
fn product_id(raw: &str) -> Result<ProductId> {
    raw.parse().map_err(|_| CatalogError::ProductNotFound.into())
}

/// Paginated, keyword-filtered listing.
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<ProductPage>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = ProductQuery::new(query.keyword, query.page_number);

    let page = CatalogService::new(state.db()).list(query).await?;
    Ok(Json(page))
}

/// Best-rated products for the home page carousel.
pub async fn top(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(CatalogService::new(state.db()).top().await?))
}

/// A single product with its reviews.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = product_id(&id)?;
    Ok(Json(CatalogService::new(state.db()).get(id).await?))
}

/// Review a product as the authenticated user.
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RequireAuth(user): RequireAuth,
    AppJson(request): AppJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let id = product_id(&id)?;
    let product = CatalogService::new(state.db())
        .add_review(id, &user, request)
        .await?;

    tracing::info!(
        product_id = %product.id,
        num_reviews = product.num_reviews,
        rating = product.rating,
        "Review added"
    );
    Ok((StatusCode::CREATED, Json(Message::new("Review added"))))
}
