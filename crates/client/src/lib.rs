//! ProShop client state engine.
//!
//! Everything a storefront UI needs short of rendering:
//! - [`store`] - A single application-state object driven by a pure [`reducer`]
//! - [`effects`] - Action creators that call the API and dispatch the outcome
//! - [`http`] - The API over HTTP
//! - [`storage`] - Session persistence (logged-in user, cart)
//! - [`screens`] - View-models that decide what to fetch for a route
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use proshop_client::{Effects, HttpShopApi, JsonFileStorage};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpShopApi::new("http://127.0.0.1:5000")?);
//! let storage = Arc::new(JsonFileStorage::new("session.json"));
//! let effects = Effects::restore(api, storage).await?;
//!
//! effects.list_products(Some("phone"), None).await;
//! let page = effects.store().state(|s| s.product_list.data().cloned());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod action;
pub mod api;
pub mod effects;
pub mod http;
pub mod reducer;
pub mod screens;
pub mod slice;
pub mod state;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use action::Action;
pub use api::{ApiError, ShopApi};
pub use effects::Effects;
pub use http::HttpShopApi;
pub use reducer::{Reducer, ShopReducer};
pub use slice::{Remote, SliceAction};
pub use state::{Cart, CartItem, ShopState};
pub use storage::{JsonFileStorage, MemoryStorage, SessionExt, SessionStorage, StorageError};
pub use store::Store;
