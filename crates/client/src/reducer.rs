//! Pure state transitions.

use crate::action::Action;
use crate::slice::Remote;
use crate::state::ShopState;

/// A pure `(state, action) -> state` function.
///
/// Implementations must not perform I/O; side effects live in
/// [`Effects`](crate::effects::Effects).
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// Apply `action` to `state` in place.
    fn reduce(&self, state: &mut Self::State, action: Self::Action);
}

/// Routes each [`Action`] to the slice it belongs to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShopReducer;

impl Reducer for ShopReducer {
    type State = ShopState;
    type Action = Action;

    fn reduce(&self, state: &mut ShopState, action: Action) {
        match action {
            Action::ProductList(a) => state.product_list.apply(a),
            Action::ProductDetails(a) => state.product_details.apply(a),
            Action::ProductReviewCreate(a) => state.product_review_create.apply(a),
            Action::UserLogin(a) => state.user_login.apply(a),
            Action::UserRegister(a) => state.user_register.apply(a),
            Action::UserDetails(a) => state.user_details.apply(a),
            Action::UserUpdateProfile(a) => state.user_update_profile.apply(a),
            Action::UserLogout => {
                state.user_login = Remote::Idle;
                state.user_details = Remote::Idle;
                state.user_update_profile = Remote::Idle;
            }
            Action::CartAddItem(item) => state.cart.upsert(item),
            Action::CartRemoveItem(product) => state.cart.remove(product),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proshop_core::wire::{UserInfo, UserProfile};
    use proshop_core::{Price, ProductId, UserId};

    use super::*;
    use crate::slice::SliceAction;
    use crate::state::CartItem;

    fn user_info() -> UserInfo {
        UserInfo {
            id: UserId::new(1),
            name: "Jane".to_owned(),
            email: "jane@example.com".to_owned(),
            is_admin: false,
            token: "token".to_owned(),
        }
    }

    fn reduce_all(actions: Vec<Action>) -> ShopState {
        let mut state = ShopState::default();
        for action in actions {
            ShopReducer.reduce(&mut state, action);
        }
        state
    }

    #[test]
    fn test_actions_touch_only_their_slice() {
        let state = reduce_all(vec![
            Action::UserLogin(SliceAction::Success(user_info())),
            Action::ProductList(SliceAction::Request),
        ]);
        assert!(state.product_list.is_loading());
        assert!(state.user_login.is_success());
        assert_eq!(state.product_details, Remote::Idle);
    }

    #[test]
    fn test_logout_resets_user_slices() {
        let state = reduce_all(vec![
            Action::UserLogin(SliceAction::Success(user_info())),
            Action::UserDetails(SliceAction::Success(UserProfile {
                id: UserId::new(1),
                name: "Jane".to_owned(),
                email: "jane@example.com".to_owned(),
                is_admin: false,
            })),
            Action::UserUpdateProfile(SliceAction::Fail("nope".to_owned())),
            Action::UserRegister(SliceAction::Success(user_info())),
            Action::UserLogout,
        ]);
        assert_eq!(state.user_login, Remote::Idle);
        assert_eq!(state.user_details, Remote::Idle);
        assert_eq!(state.user_update_profile, Remote::Idle);
        assert!(state.user_info().is_none());
        // Registration result is left alone
        assert!(state.user_register.is_success());
    }

    #[test]
    fn test_cart_actions() {
        let line = |qty| CartItem {
            product: ProductId::new(5),
            name: "Mouse".to_owned(),
            image: String::new(),
            price: Price::from_cents(4999),
            count_in_stock: 7,
            qty,
        };
        let state = reduce_all(vec![Action::CartAddItem(line(1)), Action::CartAddItem(line(2))]);
        assert_eq!(state.cart.items, vec![line(2)]);

        let state = reduce_all(vec![
            Action::CartAddItem(line(1)),
            Action::CartRemoveItem(ProductId::new(5)),
        ]);
        assert!(state.cart.items.is_empty());
    }
}
