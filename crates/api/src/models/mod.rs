//! Domain models for the API.
//!
//! Types here are validated domain objects, separate from both the database
//! rows that produce them and the wire types handlers return.

pub mod product;
pub mod seed;
pub mod user;

pub use product::{NewProduct, NewReview, PAGE_SIZE, ProductListing, ProductQuery};
pub use seed::{SeedData, SeedSummary};
pub use user::{NewUser, User, UserChanges};
