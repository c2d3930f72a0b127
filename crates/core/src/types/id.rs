//! Typed row identifiers.
//!
//! Each table's `SERIAL` key gets its own wrapper, so handing a `ProductId`
//! to a user lookup is a compile error. On the wire they are bare numbers;
//! in paths and token subjects they are decimal strings.

/// Declare one or more `i32`-backed identifier types.
///
/// Every declared type is `Copy`, ordered, hashable and `serde`-transparent,
/// converts to and from `i32`, and round-trips through `Display`/`FromStr`.
/// With the `postgres` feature it also binds and decodes as `INTEGER`.
///
/// ```rust
/// # use proshop_core::define_id;
/// define_id! {
///     /// An order row.
///     OrderId
/// }
///
/// let id: OrderId = "42".parse().unwrap();
/// assert_eq!(i32::from(id), 42);
/// ```
#[macro_export]
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(::serde::Serialize, ::serde::Deserialize)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(raw: &str) -> ::core::result::Result<Self, Self::Err> {
                raw.parse().map(Self)
            }
        }
    )+};
}

define_id! {
    /// Row in `users`; also the bearer token subject.
    UserId
    /// Row in `products`.
    ProductId
    /// Row in `reviews`.
    ReviewId
}
