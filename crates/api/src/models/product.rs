//! Product catalog domain types.

use proshop_core::wire::Product;
use proshop_core::{Price, Rating, UserId};

/// Products per listing page.
pub const PAGE_SIZE: u32 = 10;

/// A validated listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name.
    pub keyword: Option<String>,
    /// 1-based page number.
    pub page: u32,
}

impl ProductQuery {
    /// Build a query, dropping blank keywords and clamping the page to 1.
    #[must_use]
    pub fn new(keyword: Option<String>, page: Option<u32>) -> Self {
        let keyword = keyword
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());
        Self {
            keyword,
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Rows to skip for this page. Widened so any `u32` page is representable.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(PAGE_SIZE)
    }

    /// Whether `name` matches the keyword filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.keyword
            .as_deref()
            .is_none_or(|k| name.to_lowercase().contains(&k.to_lowercase()))
    }
}

/// One page of products plus the total number of matches.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub total: u32,
}

impl ProductListing {
    /// Number of pages needed for `total` matches.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.total.div_ceil(PAGE_SIZE)
    }
}

/// A review about to be appended to a product.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user: UserId,
    pub name: String,
    pub rating: Rating,
    pub comment: String,
}

/// A catalog entry to insert (used by seeding).
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Price,
    pub count_in_stock: u32,
}
