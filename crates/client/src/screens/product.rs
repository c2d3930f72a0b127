//! Product detail route: `/product/{id}`.

use thiserror::Error;

use proshop_core::ProductId;
use proshop_core::wire::{CreateReviewRequest, Product};

use super::Command;
use crate::state::ShopState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewFormError {
    #[error("Please sign in to write a review")]
    NotLoggedIn,

    #[error("Please select a rating")]
    NoRating,
}

/// Local review form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    /// `0` until the user picks a rating.
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct ProductScreen {
    route_id: ProductId,
    /// Product id of the last fetch issued from this screen.
    fetched_for: Option<ProductId>,
    qty: u32,
    pub review: ReviewForm,
}

impl ProductScreen {
    #[must_use]
    pub fn new(route_id: ProductId) -> Self {
        Self {
            route_id,
            fetched_for: None,
            qty: 1,
            review: ReviewForm::default(),
        }
    }

    #[must_use]
    pub const fn route_id(&self) -> ProductId {
        self.route_id
    }

    /// Follow a route change to another product.
    pub fn navigate(&mut self, id: ProductId) {
        if id != self.route_id {
            self.route_id = id;
            self.qty = 1;
            self.review = ReviewForm::default();
        }
    }

    /// Decide what to fetch for the current route.
    ///
    /// Call once per route change and once per state change. A fetch is
    /// issued when a review was just accepted, or when the loaded product is
    /// not the routed one. A fetch already issued for the routed id is not
    /// repeated while it is pending or after it failed; once another product
    /// has replaced the result, the routed one is fetched again.
    pub fn reconcile(&mut self, state: &ShopState) -> Vec<Command> {
        if state.product_review_create.is_success() {
            self.review = ReviewForm::default();
            self.fetched_for = Some(self.route_id);
            return vec![Command::ResetReview, Command::FetchProduct(self.route_id)];
        }

        let loaded = state.product_details.data().map(|p| p.id);
        if loaded == Some(self.route_id) {
            return Vec::new();
        }
        let replaced = loaded.is_some();
        if self.fetched_for == Some(self.route_id) && !replaced {
            return Vec::new();
        }

        self.fetched_for = Some(self.route_id);
        vec![Command::FetchProduct(self.route_id)]
    }

    /// The routed product, once it is loaded.
    #[must_use]
    pub fn product<'a>(&self, state: &'a ShopState) -> Option<&'a Product> {
        state
            .product_details
            .data()
            .filter(|p| p.id == self.route_id)
    }

    #[must_use]
    pub const fn qty(&self) -> u32 {
        self.qty
    }

    /// Pick a quantity, bounded by the stock of `product`.
    pub fn set_qty(&mut self, qty: u32, product: &Product) {
        self.qty = qty.clamp(1, product.count_in_stock.max(1));
    }

    /// Where "Add to cart" goes, or `None` while the product is not
    /// loaded or out of stock.
    #[must_use]
    pub fn cart_path(&self, state: &ShopState) -> Option<String> {
        self.product(state)
            .filter(|p| p.in_stock())
            .map(|p| format!("/cart/{}?qty={}", p.id, self.qty))
    }

    /// Validate the review form for submission.
    ///
    /// # Errors
    ///
    /// Fails without a session or before a rating is picked.
    pub fn submit_review(&self, state: &ShopState) -> Result<CreateReviewRequest, ReviewFormError> {
        if state.user_info().is_none() {
            return Err(ReviewFormError::NotLoggedIn);
        }
        if self.review.rating == 0 {
            return Err(ReviewFormError::NoRating);
        }
        Ok(CreateReviewRequest {
            rating: self.review.rating,
            comment: self.review.comment.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::Action;
    use crate::effects::Effects;
    use crate::screens::perform;
    use crate::slice::{Remote, SliceAction};
    use crate::storage::MemoryStorage;
    use crate::testing::{MockApi, product};

    fn setup() -> (Effects, Arc<MockApi>) {
        let api = Arc::new(MockApi::with_products(vec![
            product(1, "Airpods", 3),
            product(2, "iPhone", 0),
        ]));
        let effects = Effects::new(api.clone(), Arc::new(MemoryStorage::new()), ShopState::default());
        (effects, api)
    }

    /// Reconcile until the screen is settled, as a UI loop would.
    async fn settle(screen: &mut ProductScreen, effects: &Effects) {
        loop {
            let commands = screen.reconcile(&effects.store().snapshot());
            if commands.is_empty() {
                break;
            }
            perform(effects, commands).await;
        }
    }

    #[tokio::test]
    async fn test_exactly_one_fetch_per_route_change() {
        let (effects, api) = setup();
        let mut screen = ProductScreen::new(ProductId::new(1));

        settle(&mut screen, &effects).await;
        settle(&mut screen, &effects).await;
        assert_eq!(api.count_calls("product:1"), 1);

        screen.navigate(ProductId::new(2));
        settle(&mut screen, &effects).await;
        assert_eq!(api.count_calls("product:2"), 1);

        screen.navigate(ProductId::new(1));
        settle(&mut screen, &effects).await;
        assert_eq!(api.count_calls("product:"), 3);
        assert_eq!(screen.product(&effects.store().snapshot()).unwrap().name, "Airpods");
    }

    #[test]
    fn test_no_refetch_while_in_flight() {
        let mut screen = ProductScreen::new(ProductId::new(1));
        let mut state = ShopState::default();

        assert_eq!(screen.reconcile(&state), vec![Command::FetchProduct(ProductId::new(1))]);
        state.product_details = Remote::Loading;
        assert!(screen.reconcile(&state).is_empty());
        assert!(screen.reconcile(&state).is_empty());
    }

    #[tokio::test]
    async fn test_refetch_after_another_product_replaces_the_routed_one() {
        let (effects, api) = setup();
        let mut screen = ProductScreen::new(ProductId::new(1));
        settle(&mut screen, &effects).await;

        effects.list_product_details(ProductId::new(2)).await;
        assert!(screen.product(&effects.store().snapshot()).is_none());

        settle(&mut screen, &effects).await;
        assert_eq!(api.count_calls("product:1"), 2);
        assert_eq!(screen.product(&effects.store().snapshot()).unwrap().name, "Airpods");
    }

    #[tokio::test]
    async fn test_missing_product_is_not_refetched() {
        let (effects, api) = setup();
        let mut screen = ProductScreen::new(ProductId::new(99));

        settle(&mut screen, &effects).await;

        let state = effects.store().snapshot();
        assert_eq!(state.product_details.error(), Some("Product not found"));
        assert!(screen.reconcile(&state).is_empty());
        assert_eq!(api.count_calls("product:99"), 1);
    }

    #[tokio::test]
    async fn test_review_success_refetches_and_clears_form() {
        let (effects, api) = setup();
        effects.register("Jane", "jane@example.com", "123456").await;
        let mut screen = ProductScreen::new(ProductId::new(1));
        settle(&mut screen, &effects).await;

        screen.review = ReviewForm {
            rating: 4,
            comment: "Solid".to_owned(),
        };
        let request = screen.submit_review(&effects.store().snapshot()).unwrap();
        effects.create_product_review(ProductId::new(1), request).await;

        settle(&mut screen, &effects).await;

        let state = effects.store().snapshot();
        assert_eq!(screen.review, ReviewForm::default());
        assert_eq!(state.product_review_create, Remote::Idle);
        assert_eq!(api.count_calls("product:1"), 2);
        let loaded = screen.product(&state).unwrap();
        assert_eq!(loaded.num_reviews, 1);
        assert!((loaded.rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_review_failure_keeps_form() {
        let (effects, api) = setup();
        effects.register("Jane", "jane@example.com", "123456").await;
        let mut screen = ProductScreen::new(ProductId::new(1));
        settle(&mut screen, &effects).await;

        for comment in ["First", "Again"] {
            screen.review = ReviewForm {
                rating: 5,
                comment: comment.to_owned(),
            };
            let request = screen.submit_review(&effects.store().snapshot()).unwrap();
            effects.create_product_review(ProductId::new(1), request).await;
            settle(&mut screen, &effects).await;
        }

        let state = effects.store().snapshot();
        assert_eq!(state.product_review_create.error(), Some("Product already reviewed"));
        assert_eq!(screen.review.comment, "Again");
        // One refetch for the accepted review only
        assert_eq!(api.count_calls("product:1"), 2);
    }

    #[test]
    fn test_review_requires_login_and_rating() {
        let mut screen = ProductScreen::new(ProductId::new(1));
        let mut state = ShopState::default();
        assert_eq!(screen.submit_review(&state), Err(ReviewFormError::NotLoggedIn));

        state.user_login.apply(SliceAction::Success(proshop_core::wire::UserInfo {
            id: proshop_core::UserId::new(1),
            name: "Jane".to_owned(),
            email: "jane@example.com".to_owned(),
            is_admin: false,
            token: "t".to_owned(),
        }));
        assert_eq!(screen.submit_review(&state), Err(ReviewFormError::NoRating));

        screen.review.rating = 3;
        assert_eq!(screen.submit_review(&state).unwrap().rating, 3);
    }

    #[tokio::test]
    async fn test_cart_path_bounded_by_stock() {
        let (effects, _) = setup();
        let mut screen = ProductScreen::new(ProductId::new(1));
        assert_eq!(screen.cart_path(&effects.store().snapshot()), None);

        settle(&mut screen, &effects).await;
        let state = effects.store().snapshot();
        let airpods = screen.product(&state).unwrap().clone();

        screen.set_qty(10, &airpods);
        assert_eq!(screen.cart_path(&state).as_deref(), Some("/cart/1?qty=3"));
        screen.set_qty(0, &airpods);
        assert_eq!(screen.qty(), 1);

        screen.navigate(ProductId::new(2));
        settle(&mut screen, &effects).await;
        assert_eq!(screen.cart_path(&effects.store().snapshot()), None);
    }

    #[tokio::test]
    async fn test_subscriber_driven_reconcile() {
        let (effects, api) = setup();
        let effects = Arc::new(effects);
        let mut screen = ProductScreen::new(ProductId::new(1));
        let mut updates = effects.store().subscribe();

        let first = screen.reconcile(&updates.borrow_and_update());
        perform(&effects, first).await;

        // Every dispatched action wakes the subscriber; none of them causes another fetch
        while updates.has_changed().unwrap() {
            let state = updates.borrow_and_update().clone();
            assert!(screen.reconcile(&state).is_empty());
        }
        effects.store().dispatch(Action::CartRemoveItem(ProductId::new(5)));
        assert!(screen.reconcile(&effects.store().snapshot()).is_empty());
        assert_eq!(api.count_calls("product:"), 1);
    }
}
