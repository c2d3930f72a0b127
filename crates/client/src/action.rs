//! Every state transition the client can dispatch.

use proshop_core::ProductId;
use proshop_core::wire::{Product, ProductPage, UserInfo, UserProfile};

use crate::slice::SliceAction;
use crate::state::CartItem;

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ProductList(SliceAction<ProductPage>),
    ProductDetails(SliceAction<Product>),
    ProductReviewCreate(SliceAction<()>),
    UserLogin(SliceAction<UserInfo>),
    UserRegister(SliceAction<UserInfo>),
    UserDetails(SliceAction<UserProfile>),
    UserUpdateProfile(SliceAction<UserInfo>),
    /// Forget the session: login, details and profile-update slices reset.
    UserLogout,
    /// Add a line, replacing any existing line for the same product.
    CartAddItem(CartItem),
    CartRemoveItem(ProductId),
}

impl Action {
    /// Stable name for logs, e.g. `PRODUCT_DETAILS_SUCCESS`.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        macro_rules! slice_tag {
            ($action:expr, $prefix:literal) => {
                match $action {
                    SliceAction::Request => concat!($prefix, "_REQUEST"),
                    SliceAction::Success(_) => concat!($prefix, "_SUCCESS"),
                    SliceAction::Fail(_) => concat!($prefix, "_FAIL"),
                    SliceAction::Reset => concat!($prefix, "_RESET"),
                }
            };
        }

        match self {
            Self::ProductList(a) => slice_tag!(a, "PRODUCT_LIST"),
            Self::ProductDetails(a) => slice_tag!(a, "PRODUCT_DETAILS"),
            Self::ProductReviewCreate(a) => slice_tag!(a, "PRODUCT_CREATE_REVIEW"),
            Self::UserLogin(a) => slice_tag!(a, "USER_LOGIN"),
            Self::UserRegister(a) => slice_tag!(a, "USER_REGISTER"),
            Self::UserDetails(a) => slice_tag!(a, "USER_DETAILS"),
            Self::UserUpdateProfile(a) => slice_tag!(a, "USER_UPDATE_PROFILE"),
            Self::UserLogout => "USER_LOGOUT",
            Self::CartAddItem(_) => "CART_ADD_ITEM",
            Self::CartRemoveItem(_) => "CART_REMOVE_ITEM",
        }
    }
}
