//! Product listing and review submission.

use thiserror::Error;

use proshop_core::wire::{CreateReviewRequest, Product, ProductPage};
use proshop_core::{ProductId, Rating, RatingError};

use crate::db::{Database, RepositoryError};
use crate::models::{NewReview, ProductQuery, User};

/// Products returned by the "top rated" carousel.
pub const TOP_PRODUCTS: u32 = 3;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    ProductNotFound,

    #[error("product already reviewed")]
    AlreadyReviewed,

    #[error("invalid rating: {0}")]
    InvalidRating(#[from] RatingError),

    #[error("comment is required")]
    EmptyComment,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read access to the catalog plus review submission.
pub struct CatalogService<'a> {
    db: &'a dyn Database,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// One page of the listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self, query: ProductQuery) -> Result<ProductPage, CatalogError> {
        let listing = self.db.list_products(&query).await?;
        let pages = listing.pages();
        Ok(ProductPage {
            products: listing.products,
            page: query.page,
            pages,
        })
    }

    /// The best-rated products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn top(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.db.top_products(TOP_PRODUCTS).await?)
    }

    /// A single product with its reviews.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if no product has this ID.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.db
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Add `author`'s review to a product and return the updated product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidRating` / `CatalogError::EmptyComment`
    /// for bad input, `CatalogError::ProductNotFound` for an unknown product
    /// and `CatalogError::AlreadyReviewed` if `author` reviewed it before.
    pub async fn add_review(
        &self,
        product: ProductId,
        author: &User,
        request: CreateReviewRequest,
    ) -> Result<Product, CatalogError> {
        let rating = Rating::new(request.rating)?;
        let comment = request.comment.trim();
        if comment.is_empty() {
            return Err(CatalogError::EmptyComment);
        }

        let review = NewReview {
            user: author.id,
            name: author.name.clone(),
            rating,
            comment: comment.to_owned(),
        };

        self.db
            .add_review(product, review)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::ProductNotFound,
                RepositoryError::Conflict(_) => CatalogError::AlreadyReviewed,
                other => CatalogError::Repository(other),
            })
    }
}
