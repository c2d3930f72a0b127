//! Business logic services for the API.
//!
//! # Services
//!
//! - `auth` - Password login, registration, profile updates
//! - `catalog` - Product listing and review submission
//! - `token` - Bearer token issuing and verification

pub mod auth;
pub mod catalog;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use token::{TokenError, TokenService};
