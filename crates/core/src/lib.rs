//! ProShop Core - Shared types library.
//!
//! This crate provides the types shared by every ProShop component:
//! - `api` - REST backend (users, products, reviews)
//! - `client` - Client-side state engine talking to the API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Both halves of the system serialize the same [`wire`]
//! structs, so the JSON contract lives in exactly one place.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, ratings and prices
//! - [`wire`] - JSON request and response bodies of the HTTP API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod wire;

pub use types::*;
