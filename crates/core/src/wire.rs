//! JSON bodies exchanged over the HTTP API.
//!
//! The API serializes these types and the client deserializes them, so both
//! halves agree on the contract by construction. All keys are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Price, ProductId, Rating, ReviewId, UserId};

// =============================================================================
// Users
// =============================================================================

/// `POST /api/users/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/users` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `PUT /api/users/profile` body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Public view of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user profile plus a freshly issued bearer token.
///
/// Returned by login, registration and profile update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub token: String,
}

impl UserInfo {
    /// Attach a token to a profile.
    #[must_use]
    pub fn new(profile: UserProfile, token: String) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            is_admin: profile.is_admin,
            token,
        }
    }

    /// The profile part, without the token.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// A customer review as shown on the product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user: UserId,
    pub name: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog product with its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Price,
    pub count_in_stock: u32,
    pub rating: f64,
    pub num_reviews: u32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }

    /// Whether `user` has already reviewed this product.
    #[must_use]
    pub fn reviewed_by(&self, user: UserId) -> bool {
        self.reviews.iter().any(|r| r.user == user)
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub pages: u32,
}

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// `POST /api/products/{id}/reviews` body.
///
/// The rating is kept as a raw integer so an out-of-range value reaches the
/// handler and is reported as a validation error with a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub comment: String,
}

// =============================================================================
// Generic
// =============================================================================

/// `{"message": "..."}` body used for errors and simple acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    /// Create a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_uses_camel_case_keys() {
        let info = UserInfo {
            id: UserId::new(1),
            name: "Jane".to_owned(),
            email: "jane@example.com".to_owned(),
            is_admin: false,
            token: "t".to_owned(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["id"], 1);
        assert!(json.get("is_admin").is_none());
    }

    #[test]
    fn test_update_profile_request_fields_are_optional() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"name":"New"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("New"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"name":"New"}"#);
    }

    #[test]
    fn test_product_list_query_keys() {
        let query = ProductListQuery {
            keyword: Some("phone".to_owned()),
            page_number: Some(2),
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["pageNumber"], 2);
    }

    #[test]
    fn test_product_reviewed_by() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(1),
            name: "Airpods".to_owned(),
            image: "/images/airpods.jpg".to_owned(),
            brand: "Apple".to_owned(),
            category: "Electronics".to_owned(),
            description: String::new(),
            price: Price::from_cents(8999),
            count_in_stock: 0,
            rating: 5.0,
            num_reviews: 1,
            reviews: vec![Review {
                id: ReviewId::new(1),
                user: UserId::new(7),
                name: "Jane".to_owned(),
                rating: Rating::new(5).unwrap(),
                comment: "Great".to_owned(),
                created_at: now,
            }],
            created_at: now,
            updated_at: now,
        };
        assert!(product.reviewed_by(UserId::new(7)));
        assert!(!product.reviewed_by(UserId::new(8)));
        assert!(!product.in_stock());
    }
}
