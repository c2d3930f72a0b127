//! Action creators: call the API, then dispatch the outcome.
//!
//! Every remote operation follows the same shape: dispatch `Request`, await
//! the API, dispatch `Success` or `Fail`. Nothing is retried and nothing is
//! cancelled, so a slow response can overwrite a newer one.

use std::sync::Arc;

use tracing::{debug, warn};

use proshop_core::ProductId;
use proshop_core::wire::{
    CreateReviewRequest, LoginRequest, ProductListQuery, RegisterRequest, UpdateProfileRequest,
    UserInfo,
};

use crate::action::Action;
use crate::api::{ApiError, ShopApi};
use crate::reducer::ShopReducer;
use crate::slice::SliceAction;
use crate::state::{CartItem, ShopState};
use crate::storage::{CART_ITEMS_KEY, SessionExt, SessionStorage, StorageError, USER_INFO_KEY};
use crate::store::Store;

/// Message used when an authenticated action runs without a session.
pub const NOT_LOGGED_IN: &str = "Not authorized, no token";

/// The store plus the collaborators effects need.
pub struct Effects {
    store: Store<ShopReducer>,
    api: Arc<dyn ShopApi>,
    storage: Arc<dyn SessionStorage>,
}

impl Effects {
    /// Start from an explicit state.
    #[must_use]
    pub fn new(api: Arc<dyn ShopApi>, storage: Arc<dyn SessionStorage>, initial: ShopState) -> Self {
        Self {
            store: Store::new(initial, ShopReducer),
            api,
            storage,
        }
    }

    /// Start from the session saved in `storage`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored session cannot be read.
    pub async fn restore(api: Arc<dyn ShopApi>, storage: Arc<dyn SessionStorage>) -> Result<Self, StorageError> {
        let user_info = storage.load_user_info().await?;
        let cart = storage.load_cart().await?;
        Ok(Self::new(api, storage, ShopState::hydrate(user_info, cart)))
    }

    #[must_use]
    pub const fn store(&self) -> &Store<ShopReducer> {
        &self.store
    }

    fn dispatch(&self, action: Action) {
        debug!(action = action.tag(), "dispatch");
        self.store.dispatch(action);
    }

    fn token(&self) -> Option<String> {
        self.store
            .state(|s| s.user_info().map(|u| u.token.clone()))
    }

    async fn persist_user(&self, info: &UserInfo) {
        if let Err(e) = self.storage.save(USER_INFO_KEY, info).await {
            warn!(error = %e, "Failed to persist session");
        }
    }

    async fn persist_cart(&self) {
        let items = self.store.state(|s| s.cart.items.clone());
        if let Err(e) = self.storage.save(CART_ITEMS_KEY, &items).await {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self, keyword: Option<&str>, page: Option<u32>) {
        self.dispatch(Action::ProductList(SliceAction::Request));
        let query = ProductListQuery {
            keyword: keyword.map(str::to_owned),
            page_number: page,
        };
        let outcome = match self.api.list_products(&query).await {
            Ok(page) => SliceAction::Success(page),
            Err(e) => SliceAction::Fail(e.to_string()),
        };
        self.dispatch(Action::ProductList(outcome));
    }

    pub async fn list_product_details(&self, id: ProductId) {
        self.dispatch(Action::ProductDetails(SliceAction::Request));
        let outcome = match self.api.product(id).await {
            Ok(product) => SliceAction::Success(product),
            Err(e) => SliceAction::Fail(e.to_string()),
        };
        self.dispatch(Action::ProductDetails(outcome));
    }

    pub async fn create_product_review(&self, id: ProductId, review: CreateReviewRequest) {
        self.dispatch(Action::ProductReviewCreate(SliceAction::Request));
        let outcome = match self.token() {
            None => SliceAction::Fail(NOT_LOGGED_IN.to_owned()),
            Some(token) => match self.api.create_review(id, &review, &token).await {
                Ok(()) => SliceAction::Success(()),
                Err(e) => SliceAction::Fail(e.to_string()),
            },
        };
        self.dispatch(Action::ProductReviewCreate(outcome));
    }

    /// Return the review-submission slice to idle.
    pub fn reset_product_review(&self) {
        self.dispatch(Action::ProductReviewCreate(SliceAction::Reset));
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) {
        self.dispatch(Action::UserLogin(SliceAction::Request));
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.api.login(&request).await {
            Ok(info) => {
                self.dispatch(Action::UserLogin(SliceAction::Success(info.clone())));
                self.persist_user(&info).await;
            }
            Err(e) => self.dispatch(Action::UserLogin(SliceAction::Fail(e.to_string()))),
        }
    }

    /// Register and, on success, log the new account in.
    pub async fn register(&self, name: &str, email: &str, password: &str) {
        self.dispatch(Action::UserRegister(SliceAction::Request));
        let request = RegisterRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.api.register(&request).await {
            Ok(info) => {
                self.dispatch(Action::UserRegister(SliceAction::Success(info.clone())));
                self.dispatch(Action::UserLogin(SliceAction::Success(info.clone())));
                self.persist_user(&info).await;
            }
            Err(e) => self.dispatch(Action::UserRegister(SliceAction::Fail(e.to_string()))),
        }
    }

    pub async fn logout(&self) {
        if let Err(e) = self.storage.remove(USER_INFO_KEY).await {
            warn!(error = %e, "Failed to clear session");
        }
        self.dispatch(Action::UserLogout);
    }

    pub async fn get_user_details(&self) {
        self.dispatch(Action::UserDetails(SliceAction::Request));
        let outcome = match self.token() {
            None => SliceAction::Fail(NOT_LOGGED_IN.to_owned()),
            Some(token) => match self.api.profile(&token).await {
                Ok(profile) => SliceAction::Success(profile),
                Err(e) => SliceAction::Fail(e.to_string()),
            },
        };
        self.dispatch(Action::UserDetails(outcome));
    }

    /// Update the profile; the session picks up the re-issued token.
    pub async fn update_user_profile(&self, request: UpdateProfileRequest) {
        self.dispatch(Action::UserUpdateProfile(SliceAction::Request));
        let Some(token) = self.token() else {
            self.dispatch(Action::UserUpdateProfile(SliceAction::Fail(NOT_LOGGED_IN.to_owned())));
            return;
        };
        match self.api.update_profile(&request, &token).await {
            Ok(info) => {
                self.dispatch(Action::UserUpdateProfile(SliceAction::Success(info.clone())));
                self.dispatch(Action::UserLogin(SliceAction::Success(info.clone())));
                self.dispatch(Action::UserDetails(SliceAction::Success(info.profile())));
                self.persist_user(&info).await;
            }
            Err(e) => self.dispatch(Action::UserUpdateProfile(SliceAction::Fail(e.to_string()))),
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the product and put `qty` of it in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the product cannot be loaded; the cart is unchanged.
    pub async fn add_to_cart(&self, id: ProductId, qty: u32) -> Result<(), ApiError> {
        let product = self.api.product(id).await?;
        self.dispatch(Action::CartAddItem(CartItem::new(&product, qty)));
        self.persist_cart().await;
        Ok(())
    }

    pub async fn remove_from_cart(&self, id: ProductId) {
        self.dispatch(Action::CartRemoveItem(id));
        self.persist_cart().await;
    }
}
