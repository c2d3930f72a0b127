//! In-process [`ShopApi`] double for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use proshop_core::wire::{
    CreateReviewRequest, LoginRequest, Product, ProductListQuery, ProductPage, RegisterRequest,
    Review, UpdateProfileRequest, UserInfo, UserProfile,
};
use proshop_core::{Price, ProductId, Rating, ReviewId, UserId, mean_rating};

use crate::api::{ApiError, ShopApi};

pub fn product(id: i32, name: &str, count_in_stock: u32) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        image: format!("/images/{id}.jpg"),
        brand: "Brand".to_owned(),
        category: "Electronics".to_owned(),
        description: String::new(),
        price: Price::from_cents(1999),
        count_in_stock,
        rating: 0.0,
        num_reviews: 0,
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn server(status: u16, message: &str) -> ApiError {
    ApiError::Server {
        status,
        message: message.to_owned(),
    }
}

#[derive(Default)]
pub struct MockApi {
    products: Mutex<BTreeMap<ProductId, Product>>,
    users: Mutex<Vec<(String, UserInfo)>>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<ProductId, oneshot::Receiver<()>>>,
    offline: AtomicBool,
}

impl MockApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        *api.products.lock().unwrap() = products.into_iter().map(|p| (p.id, p)).collect();
        api
    }

    /// Hold the next `product(id)` response until the returned sender fires.
    pub fn gate(&self, id: ProductId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(id, rx);
        tx
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_owned()));
        }
        Ok(())
    }

    fn user_by_token(&self, token: &str) -> Result<UserInfo, ApiError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|(_, u)| u)
            .find(|u| u.token == token)
            .cloned()
            .ok_or_else(|| server(401, "Not authorized, token failed"))
    }
}

#[async_trait]
impl ShopApi for MockApi {
    async fn list_products(&self, query: &ProductListQuery) -> Result<ProductPage, ApiError> {
        self.record(format!("list:{}", query.keyword.clone().unwrap_or_default()))?;
        let keyword = query.keyword.clone().unwrap_or_default().to_lowercase();
        let products: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.name.to_lowercase().contains(&keyword))
            .cloned()
            .collect();
        let pages = u32::from(!products.is_empty());
        Ok(ProductPage {
            products,
            page: query.page_number.unwrap_or(1),
            pages,
        })
    }

    async fn top_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record("top".to_owned())?;
        Ok(self.products.lock().unwrap().values().cloned().collect())
    }

    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.record(format!("product:{id}"))?;
        let gate = self.gates.lock().unwrap().remove(&id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| server(404, "Product not found"))
    }

    async fn create_review(
        &self,
        id: ProductId,
        review: &CreateReviewRequest,
        token: &str,
    ) -> Result<(), ApiError> {
        self.record(format!("review:{id}"))?;
        let author = self.user_by_token(token)?;
        let rating = Rating::new(review.rating).map_err(|e| server(400, &e.to_string()))?;

        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&id)
            .ok_or_else(|| server(404, "Product not found"))?;
        if product.reviewed_by(author.id) {
            return Err(server(400, "Product already reviewed"));
        }
        let next_id = i32::try_from(product.reviews.len()).unwrap() + 1;
        product.reviews.push(Review {
            id: ReviewId::new(next_id),
            user: author.id,
            name: author.name,
            rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        });
        let (count, mean) = mean_rating(product.reviews.iter().map(|r| r.rating));
        product.num_reviews = count;
        product.rating = mean;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<UserInfo, ApiError> {
        self.record("login".to_owned())?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(password, u)| u.email == request.email && *password == request.password)
            .map(|(_, u)| u.clone())
            .ok_or_else(|| server(401, "Invalid email or password"))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<UserInfo, ApiError> {
        self.record("register".to_owned())?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|(_, u)| u.email == request.email) {
            return Err(server(400, "User already exists"));
        }
        let id = i32::try_from(users.len()).unwrap() + 1;
        let info = UserInfo {
            id: UserId::new(id),
            name: request.name.clone(),
            email: request.email.clone(),
            is_admin: false,
            token: format!("token-{id}"),
        };
        users.push((request.password.clone(), info.clone()));
        Ok(info)
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.record("profile".to_owned())?;
        Ok(self.user_by_token(token)?.profile())
    }

    async fn update_profile(&self, request: &UpdateProfileRequest, token: &str) -> Result<UserInfo, ApiError> {
        self.record("update_profile".to_owned())?;
        let current = self.user_by_token(token)?;
        let mut users = self.users.lock().unwrap();
        let (password, user) = users
            .iter_mut()
            .find(|(_, u)| u.id == current.id)
            .ok_or_else(|| server(404, "User not found"))?;
        if let Some(name) = &request.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &request.email {
            user.email.clone_from(email);
        }
        if let Some(new_password) = &request.password {
            password.clone_from(new_password);
        }
        user.token = format!("{}-renewed", user.token);
        Ok(user.clone())
    }
}
