//! The store: one state object, mutated only by dispatching actions.

use tokio::sync::{broadcast, watch};

use crate::reducer::Reducer;

/// Default capacity of the action broadcast channel.
const ACTION_BROADCAST_CAPACITY: usize = 64;

/// Holds the current state and applies actions in dispatch order.
///
/// State observers use [`Store::subscribe`] (latest value); action observers
/// use [`Store::subscribe_actions`] (every action, in order).
pub struct Store<R: Reducer> {
    state: watch::Sender<R::State>,
    reducer: R,
    actions: broadcast::Sender<R::Action>,
}

impl<R> Store<R>
where
    R: Reducer,
    R::Action: Clone,
{
    /// Create a store with `initial_state`.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R) -> Self {
        let (state, _) = watch::channel(initial_state);
        let (actions, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);
        Self {
            state,
            reducer,
            actions,
        }
    }

    /// Apply `action` and notify subscribers.
    ///
    /// Dispatches are serialized: the reducer runs under the state lock and the
    /// action is broadcast before the lock is released, so action observers
    /// see the same order the reducer did.
    pub fn dispatch(&self, action: R::Action) {
        self.state.send_modify(|state| {
            self.reducer.reduce(state, action.clone());
            // No receivers is fine
            let _ = self.actions.send(action);
        });
    }

    /// Read the current state through a closure.
    pub fn state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self.state.borrow())
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.state.subscribe()
    }

    /// Receiver for every action dispatched from now on.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<R::Action> {
        self.actions.subscribe()
    }
}

impl<R> Store<R>
where
    R: Reducer,
    R::State: Clone,
{
    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> R::State {
        self.state.borrow().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::Action;
    use crate::reducer::ShopReducer;
    use crate::slice::SliceAction;
    use crate::state::ShopState;

    #[test]
    fn test_dispatch_updates_state() {
        let store = Store::new(ShopState::default(), ShopReducer);
        store.dispatch(Action::ProductReviewCreate(SliceAction::Request));
        assert!(store.state(|s| s.product_review_create.is_loading()));
        store.dispatch(Action::ProductReviewCreate(SliceAction::Success(())));
        assert!(store.snapshot().product_review_create.is_success());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = Store::new(ShopState::default(), ShopReducer);
        let mut state_rx = store.subscribe();
        let mut action_rx = store.subscribe_actions();

        store.dispatch(Action::ProductList(SliceAction::Request));

        state_rx.changed().await.unwrap();
        assert!(state_rx.borrow().product_list.is_loading());
        assert_eq!(
            action_rx.recv().await.unwrap(),
            Action::ProductList(SliceAction::Request)
        );
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_are_all_applied_in_broadcast_order() {
        let store = Arc::new(Store::new(ShopState::default(), ShopReducer));
        let mut action_rx = store.subscribe_actions();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let action = if i % 2 == 0 {
                        Action::ProductList(SliceAction::Request)
                    } else {
                        Action::ProductList(SliceAction::Fail(format!("error {i}")))
                    };
                    store.dispatch(action);
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // Replaying the broadcast sequence reproduces the final state
        let mut replay = ShopState::default();
        let mut seen = 0;
        while let Ok(action) = action_rx.try_recv() {
            ShopReducer.reduce(&mut replay, action);
            seen += 1;
        }
        assert_eq!(seen, 32);
        assert_eq!(replay, store.snapshot());
    }
}
