//! The application state object.

use serde::{Deserialize, Serialize};

use proshop_core::wire::{Product, ProductPage, UserInfo, UserProfile};
use proshop_core::{Price, ProductId};

use crate::slice::Remote;

/// One line of the shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: ProductId,
    pub name: String,
    pub image: String,
    pub price: Price,
    pub count_in_stock: u32,
    pub qty: u32,
}

impl CartItem {
    /// A cart line for `qty` units of `product`.
    #[must_use]
    pub fn new(product: &Product, qty: u32) -> Self {
        Self {
            product: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            count_in_stock: product.count_in_stock,
            qty,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// Cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Insert `item`, replacing the existing line for the same product in place.
    pub fn upsert(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.product == item.product) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, product: ProductId) {
        self.items.retain(|i| i.product != product);
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.qty).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Everything the client renders from.
///
/// Changed only by dispatching actions through the
/// [`Store`](crate::store::Store).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopState {
    pub product_list: Remote<ProductPage>,
    pub product_details: Remote<Product>,
    pub product_review_create: Remote<()>,
    pub user_login: Remote<UserInfo>,
    pub user_register: Remote<UserInfo>,
    pub user_details: Remote<UserProfile>,
    pub user_update_profile: Remote<UserInfo>,
    pub cart: Cart,
}

impl ShopState {
    /// Initial state restored from a previous session.
    #[must_use]
    pub fn hydrate(user_info: Option<UserInfo>, cart_items: Vec<CartItem>) -> Self {
        Self {
            user_login: user_info.map_or(Remote::Idle, Remote::Success),
            cart: Cart { items: cart_items },
            ..Self::default()
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user_info(&self) -> Option<&UserInfo> {
        self.user_login.data()
    }
}
