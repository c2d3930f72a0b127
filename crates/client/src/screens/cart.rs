//! Cart route: `/cart`.

use proshop_core::Price;

use crate::state::{CartItem, ShopState};

/// What the cart page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: Price,
}

impl CartView {
    #[must_use]
    pub fn from_state(state: &ShopState) -> Self {
        Self {
            items: state.cart.items.clone(),
            item_count: state.cart.item_count(),
            subtotal: state.cart.subtotal(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checkout goes through login first.
    #[must_use]
    pub const fn checkout_path() -> &'static str {
        "/login?redirect=shipping"
    }
}
