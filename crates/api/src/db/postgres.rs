//! `PostgreSQL` repositories.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};

use proshop_core::wire::{Product, Review};
use proshop_core::{Email, Price, ProductId, Rating, ReviewId, UserId};

use super::{Database, ProductRepository, RepositoryError, UserRepository};
use crate::models::{
    NewProduct, NewReview, NewUser, PAGE_SIZE, ProductListing, ProductQuery, SeedData, SeedSummary,
    User, UserChanges,
};

/// Postgres-backed [`Database`].
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Delete every review, product and user. Used by `proshop-cli seed --destroy`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn destroy_all(&self) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        delete_everything(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn attach_reviews(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();

        let review_rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, product_id, user_id, name, rating, comment, created_at
            FROM reviews
            WHERE product_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<ProductId, Vec<Review>> = HashMap::new();
        for row in review_rows {
            let product_id = row.product_id;
            by_product.entry(product_id).or_default().push(row.try_into()?);
        }

        rows.into_iter()
            .map(|row| {
                let reviews = by_product.remove(&row.id).unwrap_or_default();
                row.into_product(reviews)
            })
            .collect()
    }
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}

/// Escape `%`, `_` and `\` and wrap in wildcards for `ILIKE`.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Rows
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            name: r.name,
            email,
            password_hash: r.password_hash,
            is_admin: r.is_admin,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    image: String,
    brand: String,
    category: String,
    description: String,
    price: Decimal,
    count_in_stock: i32,
    rating: f64,
    num_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, reviews: Vec<Review>) -> Result<Product, RepositoryError> {
        let price = Price::new(self.price)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid price: {e}")))?;
        let count_in_stock = u32::try_from(self.count_in_stock)
            .map_err(|_| RepositoryError::DataCorruption("negative stock count".to_owned()))?;
        let num_reviews = u32::try_from(self.num_reviews)
            .map_err(|_| RepositoryError::DataCorruption("negative review count".to_owned()))?;

        Ok(Product {
            id: self.id,
            name: self.name,
            image: self.image,
            brand: self.brand,
            category: self.category,
            description: self.description,
            price,
            count_in_stock,
            rating: self.rating,
            num_reviews,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    name: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(r.rating))
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid review rating: {e}")))?;

        Ok(Self {
            id: r.id,
            user: r.user_id,
            name: r.name,
            rating,
            comment: r.comment,
            created_at: r.created_at,
        })
    }
}

// =============================================================================
// Users
// =============================================================================

#[async_trait]
impl UserRepository for PgDatabase {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, is_admin, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, is_admin, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        insert_user_row(&self.pool, &user).await
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, is_admin, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

// =============================================================================
// Products
// =============================================================================

#[async_trait]
impl ProductRepository for PgDatabase {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductListing, RepositoryError> {
        let pattern = query.keyword.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, brand, category, description, price,
                   count_in_stock, rating, num_reviews, created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(pattern.as_deref())
        .bind(i64::from(PAGE_SIZE))
        .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let total = u32::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption("product count overflow".to_owned()))?;
        let products = self.attach_reviews(rows).await?;

        Ok(ProductListing { products, total })
    }

    async fn top_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, brand, category, description, price,
                   count_in_stock, rating, num_reviews, created_at, updated_at
            FROM products
            ORDER BY rating DESC, id ASC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        self.attach_reviews(rows).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, brand, category, description, price,
                   count_in_stock, rating, num_reviews, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_reviews(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_product(&self, owner: UserId, product: NewProduct) -> Result<Product, RepositoryError> {
        insert_product_row(&self.pool, owner, &product).await
    }

    async fn add_review(&self, product: ProductId, review: NewReview) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes aggregate recomputation per product
        let locked: Option<ProductId> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(product)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO reviews (product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product)
        .bind(review.user)
        .bind(&review.name)
        .bind(i16::from(review.rating.stars()))
        .bind(&review.comment)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "product already reviewed"))?;

        sqlx::query(
            r"
            UPDATE products
            SET num_reviews = agg.n,
                rating = agg.mean,
                updated_at = now()
            FROM (
                SELECT COUNT(*)::int4 AS n, COALESCE(AVG(rating), 0)::float8 AS mean
                FROM reviews
                WHERE product_id = $1
            ) AS agg
            WHERE products.id = $1
            ",
        )
        .bind(product)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_product(product)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn replace_all(&self, seed: SeedData) -> Result<SeedSummary, RepositoryError> {
        if !seed.is_loadable() {
            return Err(super::ownerless_catalog());
        }
        let owner_index = seed.owner();

        // Dropping `tx` on an early return rolls the wipe back
        let mut tx = self.pool.begin().await?;
        delete_everything(&mut tx).await?;

        let mut owner = None;
        for (index, user) in seed.users.iter().enumerate() {
            let created = insert_user_row(&mut *tx, user).await?;
            if Some(index) == owner_index {
                owner = Some(created.id);
            }
        }
        let mut products = 0;
        if let Some(owner) = owner {
            for product in &seed.products {
                insert_product_row(&mut *tx, owner, product).await?;
                products += 1;
            }
        }

        tx.commit().await?;
        Ok(SeedSummary {
            users: seed.users.len(),
            products,
        })
    }
}

async fn delete_everything(conn: &mut PgConnection) -> Result<(), RepositoryError> {
    for statement in ["DELETE FROM reviews", "DELETE FROM products", "DELETE FROM users"] {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

async fn insert_user_row<'e>(db: impl PgExecutor<'e>, user: &NewUser) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        INSERT INTO users (name, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password_hash, is_admin, created_at, updated_at
        ",
    )
    .bind(&user.name)
    .bind(user.email.as_str())
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .fetch_one(db)
    .await
    .map_err(|e| map_unique_violation(e, "email already exists"))?;

    row.try_into()
}

async fn insert_product_row<'e>(
    db: impl PgExecutor<'e>,
    owner: UserId,
    product: &NewProduct,
) -> Result<Product, RepositoryError> {
    let count_in_stock = i32::try_from(product.count_in_stock)
        .map_err(|_| RepositoryError::Conflict("stock count too large".to_owned()))?;

    let row = sqlx::query_as::<_, ProductRow>(
        r"
        INSERT INTO products (user_id, name, image, brand, category, description, price, count_in_stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, image, brand, category, description, price,
                  count_in_stock, rating, num_reviews, created_at, updated_at
        ",
    )
    .bind(owner)
    .bind(&product.name)
    .bind(&product.image)
    .bind(&product.brand)
    .bind(&product.category)
    .bind(&product.description)
    .bind(product.price.amount())
    .bind(count_in_stock)
    .fetch_one(db)
    .await?;

    row.into_product(Vec::new())
}
