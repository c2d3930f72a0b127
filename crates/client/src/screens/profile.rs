//! Profile route: `/profile`.

use proshop_core::wire::UpdateProfileRequest;

use super::Command;
use crate::state::ShopState;

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Profile form, prefilled from the loaded user details.
#[derive(Debug, Clone, Default)]
pub struct ProfileScreen {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Local validation message.
    pub message: Option<String>,
    requested_details: bool,
    prefilled: bool,
}

impl ProfileScreen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect without a session, fetch details once, then prefill the form.
    pub fn reconcile(&mut self, state: &ShopState) -> Vec<Command> {
        if state.user_info().is_none() {
            return vec![Command::Navigate("/login".to_owned())];
        }

        match state.user_details.data() {
            Some(profile) => {
                if !self.prefilled {
                    self.name.clone_from(&profile.name);
                    self.email.clone_from(&profile.email);
                    self.prefilled = true;
                }
                Vec::new()
            }
            None if !self.requested_details => {
                self.requested_details = true;
                vec![Command::FetchUserDetails]
            }
            None => Vec::new(),
        }
    }

    /// Build the update request, or set [`message`](Self::message) and
    /// return `None` when the password confirmation does not match.
    pub fn submit(&mut self) -> Option<UpdateProfileRequest> {
        if self.password != self.confirm_password {
            self.message = Some(PASSWORDS_DO_NOT_MATCH.to_owned());
            return None;
        }
        self.message = None;

        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_owned());
        Some(UpdateProfileRequest {
            name: non_blank(&self.name),
            email: non_blank(&self.email),
            password: non_blank(&self.password),
        })
    }

    /// Whether the last update went through.
    #[must_use]
    pub const fn updated(state: &ShopState) -> bool {
        state.user_update_profile.is_success()
    }
}
