//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use thiserror::Error;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `FromStr` so IDs can be parsed straight from command-line arguments
///
/// # Example
///
/// ```rust
/// # use sofahub_core::define_id;
/// define_id!(WishlistId);
/// define_id!(ReviewId);
///
/// let wishlist_id = WishlistId::new(1);
/// let review_id = ReviewId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WishlistId = review_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(VariationId);
define_id!(CartItemId);
define_id!(OrderId);
define_id!(CategoryId);
define_id!(ProductTypeId);
define_id!(TagId);
define_id!(ImageId);
define_id!(BlogPostId);

/// Errors that can occur when parsing an order reference.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderReferenceError {
    /// The reference does not contain a numeric order id.
    #[error("invalid order reference: {0}")]
    Invalid(String),
}

impl OrderId {
    /// Parse an order reference as shown to shoppers.
    ///
    /// Accepts a bare id (`"123"`) or an order number of the form
    /// `"ORD-123"`, where the id is the segment after the first dash.
    ///
    /// # Errors
    ///
    /// Returns `OrderReferenceError::Invalid` if no numeric id can be found.
    pub fn parse_reference(reference: &str) -> Result<Self, OrderReferenceError> {
        let trimmed = reference.trim();
        let candidate = trimmed
            .split('-')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .unwrap_or(trimmed);

        candidate
            .parse::<Self>()
            .map_err(|_| OrderReferenceError::Invalid(reference.to_string()))
    }
}
