//! End-to-end harness for ProShop.
//!
//! [`TestServer::start`] serves the real API router on an ephemeral port,
//! backed by the in-memory database, and seeds a small catalog. Tests then
//! drive it over HTTP, either with raw `reqwest` calls or through the
//! `proshop-client` effect layer.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p proshop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use proshop_api::config::{ApiConfig, Environment, SecretPolicy};
use proshop_api::db::{MemoryDatabase, ProductRepository, UserRepository};
use proshop_api::models::{NewProduct, NewUser};
use proshop_api::services::auth::hash_password;
use proshop_api::state::AppState;
use proshop_core::{Email, Price, ProductId};

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "123456";
/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@example.com";

const TEST_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%vE8";

/// A running API server.
pub struct TestServer {
    addr: SocketAddr,
    db: Arc<MemoryDatabase>,
    products: Vec<ProductId>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve a freshly seeded API on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let products = seed(&db).await;

        let config = ApiConfig {
            database_url: SecretString::from("postgres://unused/proshop"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            environment: Environment::Production,
            jwt_secret: SecretString::from(TEST_SECRET),
            token_lifetime_days: 30,
            sentry_dsn: None,
        };
        SecretPolicy::default()
            .check("JWT_SECRET", &config.jwt_secret)
            .expect("test secret would be refused at startup");
        let app = proshop_api::router(AppState::new(config, db.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            addr,
            db,
            products,
            handle,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seeded product IDs in insertion order.
    #[must_use]
    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    #[must_use]
    pub fn db(&self) -> &MemoryDatabase {
        &self.db
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn seed(db: &MemoryDatabase) -> Vec<ProductId> {
    let admin = db
        .insert_user(NewUser {
            name: "Admin User".to_owned(),
            email: Email::parse(ADMIN_EMAIL).expect("admin email"),
            password_hash: hash_password(SEED_PASSWORD).expect("hash"),
            is_admin: true,
        })
        .await
        .expect("seed admin");

    let catalog = [
        ("Airpods Wireless Bluetooth Headphones", 8999, 10),
        ("iPhone 11 Pro 256GB Memory", 59999, 7),
        ("Cannon EOS 80D DSLR Camera", 92999, 5),
        ("Amazon Echo Dot 3rd Generation", 2999, 0),
    ];

    let mut ids = Vec::with_capacity(catalog.len());
    for (name, cents, stock) in catalog {
        let product = db
            .insert_product(
                admin.id,
                NewProduct {
                    name: name.to_owned(),
                    image: "/images/sample.jpg".to_owned(),
                    brand: "Sample".to_owned(),
                    category: "Electronics".to_owned(),
                    description: format!("{name} description"),
                    price: Price::from_cents(cents),
                    count_in_stock: stock,
                },
            )
            .await
            .expect("seed product");
        ids.push(product.id);
    }
    ids
}
