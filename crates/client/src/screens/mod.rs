//! Screen view-models.
//!
//! A screen never talks to the API itself. Its `reconcile` step looks at the
//! current [`ShopState`](crate::state::ShopState) and returns the [`Command`]s
//! needed to bring it in line with the route; [`perform`] runs them.

mod cart;
mod product;
mod profile;

pub use cart::CartView;
pub use product::{ProductScreen, ReviewForm, ReviewFormError};
pub use profile::{PASSWORDS_DO_NOT_MATCH, ProfileScreen};

use proshop_core::ProductId;

use crate::effects::Effects;

/// Side effect requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchProduct(ProductId),
    ResetReview,
    FetchUserDetails,
    /// Leave the screen for another client route.
    Navigate(String),
}

/// Run `commands` in order.
///
/// Returns the last navigation target, if any command asked for one.
pub async fn perform(effects: &Effects, commands: Vec<Command>) -> Option<String> {
    let mut target = None;
    for command in commands {
        match command {
            Command::FetchProduct(id) => effects.list_product_details(id).await,
            Command::ResetReview => effects.reset_product_review(),
            Command::FetchUserDetails => effects.get_user_details().await,
            Command::Navigate(path) => target = Some(path),
        }
    }
    target
}
