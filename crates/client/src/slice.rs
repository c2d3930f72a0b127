//! The remote-data slice shared by every request-backed part of the state.
//!
//! A slice is in exactly one of four states, so "loading with stale data" or
//! "data and error at once" cannot be represented.

/// State of one remote resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Remote<T> {
    /// Nothing requested yet (initial value).
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// Last request succeeded.
    Success(T),
    /// Last request failed with a human-readable message.
    Failed(String),
}

/// The four transitions every slice accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceAction<T> {
    Request,
    Success(T),
    Fail(String),
    Reset,
}

impl<T> Remote<T> {
    /// Apply a transition. Each action fully determines the next state.
    pub fn apply(&mut self, action: SliceAction<T>) {
        *self = match action {
            SliceAction::Request => Self::Loading,
            SliceAction::Success(data) => Self::Success(data),
            SliceAction::Fail(message) => Self::Failed(message),
            SliceAction::Reset => Self::Idle,
        };
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Loaded data, if the last request succeeded.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Error message, if the last request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
