//! Persistence for the API.
//!
//! The database is the only shared mutable resource. Handlers never cache
//! records across requests; every read and write goes through the traits
//! below.
//!
//! # Tables
//!
//! - `users` - Accounts with Argon2id password hashes
//! - `products` - Catalog entries with denormalized `rating` / `num_reviews`
//! - `reviews` - One row per review, `UNIQUE (product_id, user_id)`
//!
//! # Implementations
//!
//! - [`postgres::PgDatabase`] - production, backed by `sqlx`
//! - [`memory::MemoryDatabase`] - in-process, for tests and local demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p proshop-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use proshop_core::wire::Product;
use proshop_core::{Email, ProductId, UserId};

use crate::models::{
    NewProduct, NewReview, NewUser, ProductListing, ProductQuery, SeedData, SeedSummary, User, UserChanges,
};

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, one review per user).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by ID.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update.
    ///
    /// Returns `RepositoryError::NotFound` if the user no longer exists and
    /// `RepositoryError::Conflict` if the new email belongs to someone else.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, RepositoryError>;
}

/// Catalog and review storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of products matching the query, ordered by ID.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductListing, RepositoryError>;

    /// The `limit` best-rated products.
    async fn top_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError>;

    /// A product with its reviews, oldest review first.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a catalog entry owned by `owner`.
    async fn insert_product(&self, owner: UserId, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Append a review and recompute the product's aggregate rating.
    ///
    /// The append is additive: concurrent reviews from different users are
    /// all kept. Returns `RepositoryError::NotFound` for an unknown product and
    /// `RepositoryError::Conflict` if `review.user` already reviewed it.
    async fn add_review(&self, product: ProductId, review: NewReview) -> Result<Product, RepositoryError>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait Database: UserRepository + ProductRepository {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Wipe every table and load `seed` in its place, all or nothing.
    ///
    /// On any error the previous contents are untouched. Returns
    /// `RepositoryError::Conflict` for duplicate emails or products without
    /// an admin owner.
    async fn replace_all(&self, seed: SeedData) -> Result<SeedSummary, RepositoryError>;
}

fn ownerless_catalog() -> RepositoryError {
    RepositoryError::Conflict("seeded products need an admin owner".to_owned())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
