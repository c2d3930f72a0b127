//! The backend seam used by the effect layer.

use async_trait::async_trait;
use thiserror::Error;

use proshop_core::ProductId;
use proshop_core::wire::{
    CreateReviewRequest, LoginRequest, Product, ProductListQuery, ProductPage, RegisterRequest,
    UpdateProfileRequest, UserInfo, UserProfile,
};

/// Errors from talking to the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never got a response.
    #[error("{0}")]
    Transport(String),

    /// The response body was not what the endpoint promises.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status, for server errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The ProShop REST API.
///
/// Implemented over HTTP by [`HttpShopApi`](crate::http::HttpShopApi).
#[async_trait]
pub trait ShopApi: Send + Sync {
    async fn list_products(&self, query: &ProductListQuery) -> Result<ProductPage, ApiError>;

    async fn top_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn product(&self, id: ProductId) -> Result<Product, ApiError>;

    async fn create_review(
        &self,
        id: ProductId,
        review: &CreateReviewRequest,
        token: &str,
    ) -> Result<(), ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<UserInfo, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<UserInfo, ApiError>;

    async fn profile(&self, token: &str) -> Result<UserProfile, ApiError>;

    async fn update_profile(&self, request: &UpdateProfileRequest, token: &str) -> Result<UserInfo, ApiError>;
}
