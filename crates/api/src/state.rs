//! Handler state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Database;
use crate::services::TokenService;

/// Everything a handler can reach: config, storage and the token signer.
///
/// Cloned per request by axum, so the fields live behind one `Arc`.
#[derive(Clone)]
pub struct AppState(Arc<Shared>);

struct Shared {
    config: ApiConfig,
    db: Arc<dyn Database>,
    tokens: TokenService,
}

impl AppState {
    /// The signer is derived from `config.jwt_secret`; `db` is Postgres in
    /// production and [`crate::db::MemoryDatabase`] in tests.
    #[must_use]
    pub fn new(config: ApiConfig, db: Arc<dyn Database>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_lifetime_days);
        Self(Arc::new(Shared { config, db, tokens }))
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.0.config
    }

    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.0.db.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.0.tokens
    }
}
