//! SofaHub REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the API is the source of truth
//! - Catalog metadata and product pages cached in memory via `moka`
//! - Cart, order, and contact calls always hit the network
//!
//! The cart store and checkout flow talk to the API through the [`CartApi`]
//! and [`OrderApi`] traits so they can be driven by in-memory fakes in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use sofahub_storefront::api::ApiClient;
//! use sofahub_storefront::catalog::CatalogQuery;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let sofas = client.list_products(&CatalogQuery::default().room("living-room")).await?;
//! let product = client.get_product("lamu-sofa").await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use std::future::Future;
use std::sync::Arc;

use sofahub_core::{CartItemId, VariationId};
use thiserror::Error;

/// Errors that can occur when talking to the SofaHub API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The requested product, order, or post does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response or build a request URL.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether this error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { status: 404, .. })
    }

    /// Turn a 404 response into `NotFound(what)`, leaving other errors alone.
    #[must_use]
    pub(crate) fn or_not_found(self, what: impl FnOnce() -> String) -> Self {
        if matches!(self, Self::Api { status: 404, .. }) {
            Self::NotFound(what())
        } else {
            self
        }
    }
}

/// Remote cart operations used by [`crate::cart::CartStore`].
pub trait CartApi: Send + Sync {
    /// Fetch the cart for a session. Unknown sessions yield an empty cart.
    fn get_cart(&self, session_id: &str) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    /// Add `quantity` units of a variation to the session's cart.
    fn add_item(
        &self,
        session_id: &str,
        variation_id: VariationId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Set the quantity of a cart line.
    fn update_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a cart line.
    fn remove_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Remote order creation used by [`crate::checkout::CheckoutFlow`].
pub trait OrderApi: Send + Sync {
    /// Create an order from the session's cart and start the M-Pesa deposit.
    fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

impl<T: CartApi> CartApi for Arc<T> {
    async fn get_cart(&self, session_id: &str) -> Result<Cart, ApiError> {
        (**self).get_cart(session_id).await
    }

    async fn add_item(
        &self,
        session_id: &str,
        variation_id: VariationId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        (**self).add_item(session_id, variation_id, quantity).await
    }

    async fn update_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        (**self).update_item(session_id, item_id, quantity).await
    }

    async fn remove_item(&self, session_id: &str, item_id: CartItemId) -> Result<(), ApiError> {
        (**self).remove_item(session_id, item_id).await
    }
}

impl<T: OrderApi> OrderApi for Arc<T> {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        (**self).checkout(request).await
    }
}
