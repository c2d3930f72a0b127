//! Bulk data loaded by `proshop-cli seed`.

use super::{NewProduct, NewUser};

/// Accounts plus a catalog owned by the first admin among them.
#[derive(Clone, Default)]
pub struct SeedData {
    pub users: Vec<NewUser>,
    pub products: Vec<NewProduct>,
}

/// Rows written by a successful seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub products: usize,
}

impl SeedData {
    /// Index into `users` of the catalog owner.
    #[must_use]
    pub fn owner(&self) -> Option<usize> {
        self.users.iter().position(|u| u.is_admin)
    }

    /// Whether the products have someone to belong to.
    #[must_use]
    pub fn is_loadable(&self) -> bool {
        self.products.is_empty() || self.owner().is_some()
    }
}
