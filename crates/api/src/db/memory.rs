//! In-process [`Database`] for tests and local demos.
//!
//! Mirrors the Postgres constraints: unique emails, one review per user per
//! product, aggregates recomputed from every stored review.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use proshop_core::wire::{Product, Review};
use proshop_core::{Email, ProductId, ReviewId, UserId, mean_rating};

use super::{Database, ProductRepository, RepositoryError, UserRepository};
use crate::models::{
    NewProduct, NewReview, NewUser, PAGE_SIZE, ProductListing, ProductQuery, SeedData, SeedSummary,
    User, UserChanges,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    products: BTreeMap<ProductId, Product>,
    next_user: i32,
    next_product: i32,
    next_review: i32,
}

impl Tables {
    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| &u.email == email && Some(u.id) != except)
    }

    /// Empty tables that keep handing out fresh ids, like a `DELETE` that
    /// leaves the sequences alone.
    fn emptied(&self) -> Self {
        Self {
            next_user: self.next_user,
            next_product: self.next_product,
            next_review: self.next_review,
            ..Self::default()
        }
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User, RepositoryError> {
        if self.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        self.next_user += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(self.next_user),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn insert_product(&mut self, owner: UserId, product: NewProduct) -> Result<Product, RepositoryError> {
        if !self.users.contains_key(&owner) {
            return Err(RepositoryError::NotFound);
        }

        self.next_product += 1;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(self.next_product),
            name: product.name,
            image: product.image,
            brand: product.brand,
            category: product.category,
            description: product.description,
            price: product.price,
            count_in_stock: product.count_in_stock,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }
}

/// A [`Database`] held entirely in memory.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.tables.lock().await.insert_user(user)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(email) = &changes.email
            && tables.email_taken(email, Some(id))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl ProductRepository for MemoryDatabase {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductListing, RepositoryError> {
        let tables = self.tables.lock().await;
        let matching: Vec<&Product> = tables
            .products
            .values()
            .filter(|p| query.matches(&p.name))
            .collect();

        let total = u32::try_from(matching.len())
            .map_err(|_| RepositoryError::DataCorruption("product count overflow".to_owned()))?;
        let products = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect();

        Ok(ProductListing { products, total })
    }

    async fn top_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        // Stable sort keeps ID order among equal ratings
        products.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, owner: UserId, product: NewProduct) -> Result<Product, RepositoryError> {
        self.tables.lock().await.insert_product(owner, product)
    }

    async fn add_review(&self, product: ProductId, review: NewReview) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.next_review += 1;
        let review_id = ReviewId::new(tables.next_review);

        let stored = tables
            .products
            .get_mut(&product)
            .ok_or(RepositoryError::NotFound)?;
        if stored.reviewed_by(review.user) {
            return Err(RepositoryError::Conflict(
                "product already reviewed".to_owned(),
            ));
        }

        let now = Utc::now();
        stored.reviews.push(Review {
            id: review_id,
            user: review.user,
            name: review.name,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
        });
        let (num_reviews, rating) = mean_rating(stored.reviews.iter().map(|r| r.rating));
        stored.num_reviews = num_reviews;
        stored.rating = rating;
        stored.updated_at = now;

        Ok(stored.clone())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn replace_all(&self, seed: SeedData) -> Result<SeedSummary, RepositoryError> {
        if !seed.is_loadable() {
            return Err(super::ownerless_catalog());
        }
        let owner_index = seed.owner();

        let mut tables = self.tables.lock().await;
        // Built aside and swapped in, so a failure leaves the live tables as they were
        let mut staged = tables.emptied();

        let mut owner = None;
        for (index, user) in seed.users.into_iter().enumerate() {
            let created = staged.insert_user(user)?;
            if Some(index) == owner_index {
                owner = Some(created.id);
            }
        }
        if let Some(owner) = owner {
            for product in seed.products {
                staged.insert_product(owner, product)?;
            }
        }

        let summary = SeedSummary {
            users: staged.users.len(),
            products: staged.products.len(),
        };
        *tables = staged;
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use proshop_core::{Price, Rating};

    use super::*;

    async fn seeded() -> (MemoryDatabase, UserId, ProductId) {
        let db = MemoryDatabase::new();
        let owner = db
            .insert_user(NewUser {
                name: "Admin".to_owned(),
                email: Email::parse("admin@example.com").unwrap(),
                password_hash: "hash".to_owned(),
                is_admin: true,
            })
            .await
            .unwrap();
        let product = db
            .insert_product(
                owner.id,
                NewProduct {
                    name: "Airpods Wireless Bluetooth Headphones".to_owned(),
                    image: "/images/airpods.jpg".to_owned(),
                    brand: "Apple".to_owned(),
                    category: "Electronics".to_owned(),
                    description: "Bluetooth technology".to_owned(),
                    price: Price::from_cents(8999),
                    count_in_stock: 10,
                },
            )
            .await
            .unwrap();
        (db, owner.id, product.id)
    }

    fn review(user: i32, stars: i64) -> NewReview {
        NewReview {
            user: UserId::new(user),
            name: format!("user-{user}"),
            rating: Rating::new(stars).unwrap(),
            comment: "ok".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (db, _, _) = seeded().await;
        let result = db
            .insert_user(NewUser {
                name: "Other".to_owned(),
                email: Email::parse("ADMIN@example.com").unwrap(),
                password_hash: "hash".to_owned(),
                is_admin: false,
            })
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(db.tables.lock().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_review_aggregate() {
        let (db, _, product) = seeded().await;
        db.add_review(product, review(10, 5)).await.unwrap();
        db.add_review(product, review(11, 3)).await.unwrap();
        let updated = db.add_review(product, review(12, 4)).await.unwrap();

        assert_eq!(updated.num_reviews, 3);
        assert!((updated.rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(updated.reviews.len(), 3);
    }

    #[tokio::test]
    async fn test_second_review_from_same_user_is_conflict() {
        let (db, _, product) = seeded().await;
        db.add_review(product, review(10, 5)).await.unwrap();
        let result = db.add_review(product, review(10, 1)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let stored = db.find_product(product).await.unwrap().unwrap();
        assert_eq!(stored.num_reviews, 1);
        assert!((stored.rating - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_review_on_missing_product_is_not_found() {
        let (db, _, _) = seeded().await;
        let result = db.add_review(ProductId::new(999), review(10, 5)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_concurrent_reviews_are_all_kept() {
        let (db, _, product) = seeded().await;
        let db = Arc::new(db);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let db = Arc::clone(&db);
                tokio::spawn(async move { db.add_review(product, review(100 + i, 1 + i64::from(i % 5))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = db.find_product(product).await.unwrap().unwrap();
        assert_eq!(stored.num_reviews, 20);
        assert_eq!(stored.reviews.len(), 20);
        assert!((stored.rating - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_update_user_email_conflict_and_not_found() {
        let (db, owner, _) = seeded().await;
        let other = db
            .insert_user(NewUser {
                name: "Jane".to_owned(),
                email: Email::parse("jane@example.com").unwrap(),
                password_hash: "hash".to_owned(),
                is_admin: false,
            })
            .await
            .unwrap();

        let taken = UserChanges {
            email: Some(Email::parse("admin@example.com").unwrap()),
            ..UserChanges::default()
        };
        assert!(matches!(
            db.update_user(other.id, taken).await,
            Err(RepositoryError::Conflict(_))
        ));

        let same = UserChanges {
            email: Some(Email::parse("admin@example.com").unwrap()),
            ..UserChanges::default()
        };
        assert!(db.update_user(owner, same).await.is_ok());

        assert!(matches!(
            db.update_user(UserId::new(404), UserChanges::default()).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_listing_pagination_and_keyword() {
        let (db, owner, _) = seeded().await;
        for i in 0..12 {
            db.insert_product(
                owner,
                NewProduct {
                    name: format!("Phone {i}"),
                    image: String::new(),
                    brand: "Brand".to_owned(),
                    category: "Electronics".to_owned(),
                    description: String::new(),
                    price: Price::from_cents(100),
                    count_in_stock: 1,
                },
            )
            .await
            .unwrap();
        }

        let listing = db
            .list_products(&ProductQuery::new(Some("PHONE".to_owned()), Some(2)))
            .await
            .unwrap();
        // the seeded "Headphones" matches too
        assert_eq!(listing.total, 13);
        assert_eq!(listing.pages(), 2);
        assert_eq!(listing.products.len(), 3);

        let beyond = db
            .list_products(&ProductQuery::new(None, Some(u32::MAX)))
            .await
            .unwrap();
        assert_eq!(beyond.total, 13);
        assert!(beyond.products.is_empty());

        let all = db.list_products(&ProductQuery::new(None, None)).await.unwrap();
        assert_eq!(all.total, 13);
        assert_eq!(all.products.len(), 10);
    }

    fn seed_user(email: &str, is_admin: bool) -> NewUser {
        NewUser {
            name: email.to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            is_admin,
        }
    }

    fn seed_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            image: String::new(),
            brand: "Brand".to_owned(),
            category: "Electronics".to_owned(),
            description: String::new(),
            price: Price::from_cents(500),
            count_in_stock: 2,
        }
    }

    #[tokio::test]
    async fn test_failed_seed_keeps_existing_data() {
        let (db, owner, product) = seeded().await;

        let broken = SeedData {
            users: vec![
                seed_user("boss@example.com", true),
                seed_user("twin@example.com", false),
                seed_user("TWIN@example.com", false),
            ],
            products: vec![seed_product("Mouse")],
        };
        assert!(matches!(db.replace_all(broken).await, Err(RepositoryError::Conflict(_))));

        let ownerless = SeedData {
            users: vec![seed_user("shopper@example.com", false)],
            products: vec![seed_product("Mouse")],
        };
        assert!(matches!(db.replace_all(ownerless).await, Err(RepositoryError::Conflict(_))));

        assert!(db.find_user(owner).await.unwrap().is_some());
        assert!(db.find_product(product).await.unwrap().is_some());
        assert!(
            db.find_user_by_email(&Email::parse("boss@example.com").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_seed_replaces_everything() {
        let (db, owner, product) = seeded().await;

        let summary = db
            .replace_all(SeedData {
                users: vec![seed_user("shopper@example.com", false), seed_user("boss@example.com", true)],
                products: vec![seed_product("Mouse"), seed_product("Keyboard")],
            })
            .await
            .unwrap();
        assert_eq!(summary, SeedSummary { users: 2, products: 2 });

        assert!(db.find_user(owner).await.unwrap().is_none());
        assert!(db.find_product(product).await.unwrap().is_none());

        let listing = db.list_products(&ProductQuery::new(None, None)).await.unwrap();
        let names: Vec<&str> = listing.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Mouse", "Keyboard"]);
        // Ids keep counting past the wiped rows
        assert!(listing.products.iter().all(|p| p.id > product));
    }
}
