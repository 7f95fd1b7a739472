//! Command implementations.
//!
//! Every command prints through `tracing`, so output honors `RUST_LOG`.

pub mod blog;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod orders;

use std::sync::Arc;

use sofahub_core::OrderReferenceError;
use sofahub_storefront::api::{ApiClient, ApiError};
use sofahub_storefront::cart::{CartError, CartStore};
use sofahub_storefront::checkout::{CheckoutError, PlaceOrderError};
use sofahub_storefront::config::StorefrontConfig;
use sofahub_storefront::storage::FileStorage;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{}", .0.user_message())]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    PlaceOrder(#[from] PlaceOrderError),

    #[error(transparent)]
    OrderReference(#[from] OrderReferenceError),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// API client and cart store shared by all commands.
pub struct Shop {
    pub client: ApiClient,
    pub cart: CartStore<ApiClient>,
}

impl Shop {
    /// Build the client and a cart store persisted at the configured
    /// session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.api)?;
        let storage = Arc::new(FileStorage::new(&config.session_file));
        let cart = CartStore::new(client.clone(), storage);
        Ok(Self { client, cart })
    }
}
