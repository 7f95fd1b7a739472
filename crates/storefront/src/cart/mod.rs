//! Cart state store.
//!
//! [`CartStore`] owns the client-side view of the shopper's cart. The server
//! is authoritative: every mutation is sent to the API and followed by a
//! refresh that replaces the local snapshot. Quantity changes and removals
//! are applied optimistically first and rolled back if the API rejects them.
//!
//! State changes are published on a `tokio::sync::watch` channel so any
//! number of observers can follow loading, error, and snapshot transitions.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = CartStore::new(client.clone(), Arc::new(FileStorage::new(path)));
//! store.refresh_cart().await?;
//! store.add_to_cart(VariationId::new(5), 2).await?;
//! ```

mod session;
mod summary;

pub use session::{SESSION_STORAGE_KEY, generate_session_id};
pub use summary::{CartSummary, DELIVERY_ESTIMATE, Delivery, FREE_DELIVERY_THRESHOLD};

use std::sync::{Arc, Mutex, PoisonError};

use sofahub_core::{CartItemId, VariationId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiClient, ApiError, Cart, CartApi};
use crate::storage::ClientStorage;

pub const LOAD_FAILED: &str = "Failed to load cart";
pub const ADD_FAILED: &str = "Failed to add item to cart";
pub const UPDATE_FAILED: &str = "Failed to update item quantity";
pub const REMOVE_FAILED: &str = "Failed to remove item from cart";

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities below one are rejected without contacting the API.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// The API call failed. `message` is the text surfaced to the shopper.
    #[error("{message}: {source}")]
    Api {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

impl CartError {
    /// Text suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuantity(_) => "Quantity must be at least 1".to_string(),
            Self::Api { message, .. } => (*message).to_string(),
        }
    }
}

/// Observable cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    /// Last known snapshot; `None` until the first successful load.
    pub cart: Option<Cart>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Client-side cart store synchronized with the SofaHub API.
pub struct CartStore<A = ApiClient> {
    api: A,
    storage: Arc<dyn ClientStorage>,
    /// Last session id handed out; used whenever storage cannot supply one.
    session_id: Mutex<Option<String>>,
    state: watch::Sender<CartState>,
}

impl<A: CartApi> CartStore<A> {
    /// Create a store with no snapshot loaded.
    #[must_use]
    pub fn new(api: A, storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            api,
            storage,
            session_id: Mutex::new(None),
            state: watch::Sender::new(CartState::default()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Current snapshot, if one has been loaded.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.state.borrow().cart.clone()
    }

    /// Whether the snapshot is missing or has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state
            .borrow()
            .cart
            .as_ref()
            .is_none_or(Cart::is_empty)
    }

    /// Follow state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Dismiss the surfaced error.
    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    /// The underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The current session id, generating and persisting one if needed.
    ///
    /// Storage failures are logged. The id stays stable for the lifetime of
    /// the store even when storage cannot hold it.
    pub fn get_session_id(&self) -> String {
        match self.storage.get(SESSION_STORAGE_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => {
                self.remember_session_id(&id);
                return id;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read cart session id"),
        }

        if let Some(id) = self.remembered_session_id() {
            return id;
        }

        let id = generate_session_id();
        self.persist_session_id(&id);
        id
    }

    fn persist_session_id(&self, session_id: &str) {
        self.remember_session_id(session_id);
        if let Err(e) = self.storage.set(SESSION_STORAGE_KEY, session_id) {
            warn!(error = %e, session_id = %session_id, "Failed to persist cart session id");
        }
    }

    fn remembered_session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember_session_id(&self, session_id: &str) {
        *self.session_id.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(session_id.to_string());
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace the snapshot with the server's cart.
    ///
    /// On failure the previous snapshot is kept and the error is surfaced.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the cart cannot be fetched.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) -> Result<(), CartError> {
        let session_id = self.get_session_id();
        self.state.send_modify(|state| state.is_loading = true);

        match self.api.get_cart(&session_id).await {
            Ok(cart) => {
                self.set_cart(cart);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, session_id = %session_id, "Failed to load cart");
                Err(self.fail(LOAD_FAILED, e))
            }
        }
    }

    /// Add a variation to the cart, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity, or
    /// `CartError::Api` if the item cannot be added or the cart cannot be
    /// reloaded.
    #[instrument(skip(self), fields(variation_id = %variation_id))]
    pub async fn add_to_cart(&self, variation_id: VariationId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        self.state.send_modify(|state| state.is_loading = true);
        let session_id = self.get_session_id();

        if let Err(e) = self.api.add_item(&session_id, variation_id, quantity).await {
            error!(error = %e, session_id = %session_id, "Failed to add item to cart");
            return Err(self.fail(ADD_FAILED, e));
        }

        info!(quantity, "Item added to cart");
        self.refresh_cart().await
    }

    /// Change a line's quantity optimistically, then confirm with the server.
    ///
    /// If the API rejects the change the error is surfaced and the cart is
    /// reloaded to discard the optimistic edit.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity, or
    /// `CartError::Api` if the update or the follow-up refresh fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(&self, item_id: CartItemId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        self.state.send_modify(|state| {
            if let Some(cart) = state.cart.as_mut() {
                apply_quantity(cart, item_id, quantity);
            }
        });

        let session_id = self.get_session_id();
        if let Err(e) = self.api.update_item(&session_id, item_id, quantity).await {
            error!(error = %e, session_id = %session_id, "Failed to update item quantity");
            let err = self.fail(UPDATE_FAILED, e);

            // Discard the optimistic edit but keep the failure visible.
            let _ = self.refresh_cart().await;
            self.state
                .send_modify(|state| state.error = Some(UPDATE_FAILED.to_string()));
            return Err(err);
        }

        self.refresh_cart().await
    }

    /// Remove a line optimistically, then confirm with the server.
    ///
    /// If the API rejects the removal the pre-removal snapshot is restored
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the removal or the follow-up refresh fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_from_cart(&self, item_id: CartItemId) -> Result<(), CartError> {
        let original = self.cart();

        self.state.send_modify(|state| {
            if let Some(cart) = state.cart.as_mut() {
                apply_removal(cart, item_id);
            }
        });

        let session_id = self.get_session_id();
        if let Err(e) = self.api.remove_item(&session_id, item_id).await {
            error!(error = %e, session_id = %session_id, "Failed to remove item from cart");
            self.state.send_modify(|state| {
                if original.is_some() {
                    state.cart = original;
                }
            });
            return Err(self.fail(REMOVE_FAILED, e));
        }

        self.refresh_cart().await
    }

    /// Start a new, empty cart by rotating the session id.
    ///
    /// The previous server-side cart is left in place, unreachable.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the new (empty) cart cannot be loaded.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), CartError> {
        let session_id = generate_session_id();
        self.persist_session_id(&session_id);
        info!(session_id = %session_id, "Cart session rotated");
        self.refresh_cart().await
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn set_cart(&self, cart: Cart) {
        self.state.send_modify(|state| {
            state.cart = Some(cart);
            state.is_loading = false;
            state.error = None;
        });
    }

    fn fail(&self, message: &'static str, source: ApiError) -> CartError {
        self.state.send_modify(|state| {
            state.error = Some(message.to_string());
            state.is_loading = false;
        });
        CartError::Api { message, source }
    }
}

/// Set a line's quantity and keep the cart's derived totals in step.
fn apply_quantity(cart: &mut Cart, item_id: CartItemId, quantity: u32) {
    if let Some(item) = cart.items.iter_mut().find(|item| item.id == item_id) {
        let previous = item.quantity;
        item.quantity = quantity;
        item.total_price = item.unit_price.times(quantity);
        cart.total_items = cart
            .total_items
            .saturating_sub(previous)
            .saturating_add(quantity);
    }
}

/// Drop a line and subtract its quantity from the item count.
fn apply_removal(cart: &mut Cart, item_id: CartItemId) {
    let removed = cart
        .items
        .iter()
        .find(|item| item.id == item_id)
        .map_or(0, |item| item.quantity);
    cart.items.retain(|item| item.id != item_id);
    cart.total_items = cart.total_items.saturating_sub(removed);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};
    use crate::testing::{Endpoint, FakeBackend};

    /// Storage whose every read and write fails.
    struct BrokenStorage;

    impl ClientStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk unavailable").into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk unavailable").into())
        }
    }

    fn store() -> (CartStore<Arc<FakeBackend>>, Arc<FakeBackend>, Arc<MemoryStorage>) {
        let backend = Arc::new(FakeBackend::new());
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(Arc::clone(&backend), storage.clone() as Arc<dyn ClientStorage>);
        (store, backend, storage)
    }

    // =========================================================================
    // Session Tests
    // =========================================================================

    #[test]
    fn test_session_id_is_generated_once() {
        let (store, _, storage) = store();
        let first = store.get_session_id();
        let second = store.get_session_id();

        assert_eq!(first, second);
        assert!(first.starts_with("session_"));
        assert_eq!(
            storage.get(SESSION_STORAGE_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_existing_session_id_is_reused() {
        let (store, _, storage) = store();
        storage
            .set(SESSION_STORAGE_KEY, "session_1700000000000_abcdefghi")
            .unwrap();
        assert_eq!(store.get_session_id(), "session_1700000000000_abcdefghi");
    }

    #[tokio::test]
    async fn test_session_id_stable_when_storage_fails() {
        let backend = Arc::new(FakeBackend::new());
        let store = CartStore::new(Arc::clone(&backend), Arc::new(BrokenStorage));

        let first = store.get_session_id();
        assert_eq!(store.get_session_id(), first);

        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let cart = store.cart().unwrap();
        assert_eq!(cart.session_id, first);
        assert_eq!(cart.total_items, 2);
    }

    #[tokio::test]
    async fn test_clear_cart_rotates_session_when_storage_fails() {
        let backend = Arc::new(FakeBackend::new());
        let store = CartStore::new(Arc::clone(&backend), Arc::new(BrokenStorage));
        let old_session = store.get_session_id();

        store.clear_cart().await.unwrap();
        let new_session = store.get_session_id();

        assert_ne!(new_session, old_session);
        assert_eq!(store.get_session_id(), new_session);
    }

    // =========================================================================
    // Refresh Tests
    // =========================================================================

    #[tokio::test]
    async fn test_refresh_loads_empty_cart() {
        let (store, _, _) = store();
        store.refresh_cart().await.unwrap();

        let state = store.state();
        assert!(state.cart.unwrap().is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_snapshot() {
        let (store, backend, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let before = store.cart();

        backend.fail(Endpoint::GetCart, 503, "Service Unavailable");
        let err = store.refresh_cart().await.unwrap_err();

        assert_eq!(err.user_message(), LOAD_FAILED);
        let state = store.state();
        assert_eq!(state.cart, before);
        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED));
        assert!(!state.is_loading);
    }

    // =========================================================================
    // Add / Update Tests
    // =========================================================================

    #[tokio::test]
    async fn test_add_then_update_quantity() {
        let (store, _, _) = store();

        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let cart = store.cart().unwrap();
        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);

        store.update_quantity(cart.items[0].id, 3).await.unwrap();
        let cart = store.cart().unwrap();
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_network() {
        let (store, backend, _) = store();

        let err = store.add_to_cart(VariationId::new(5), 0).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(0)));
        assert_eq!(backend.calls(Endpoint::AddItem), 0);

        let err = store.update_quantity(CartItemId::new(1), 0).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(0)));
        assert_eq!(backend.calls(Endpoint::UpdateItem), 0);
        assert_eq!(backend.calls(Endpoint::GetCart), 0);
    }

    #[tokio::test]
    async fn test_add_failure_leaves_snapshot() {
        let (store, backend, _) = store();
        store.refresh_cart().await.unwrap();
        let refreshes = backend.calls(Endpoint::GetCart);

        backend.fail(Endpoint::AddItem, 400, "Insufficient stock");
        let err = store.add_to_cart(VariationId::new(5), 1).await.unwrap_err();

        assert_eq!(err.user_message(), ADD_FAILED);
        assert!(store.cart().unwrap().is_empty());
        assert_eq!(store.state().error.as_deref(), Some(ADD_FAILED));
        assert_eq!(backend.calls(Endpoint::GetCart), refreshes);
    }

    #[tokio::test]
    async fn test_update_failure_rolls_back_and_keeps_error() {
        let (store, backend, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let item_id = store.cart().unwrap().items[0].id;

        backend.fail(Endpoint::UpdateItem, 400, "Insufficient stock");
        let err = store.update_quantity(item_id, 9).await.unwrap_err();

        assert_eq!(err.user_message(), UPDATE_FAILED);
        let state = store.state();
        assert_eq!(state.cart.unwrap().items[0].quantity, 2);
        assert_eq!(state.error.as_deref(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_optimistic_update_is_published() {
        let (store, backend, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let item_id = store.cart().unwrap().items[0].id;

        let mut rx = store.subscribe();
        rx.mark_unchanged();
        backend.fail(Endpoint::GetCart, 500, "boom");
        let _ = store.update_quantity(item_id, 4).await;

        // Refresh failed, so the optimistic edit is what remains.
        let cart = rx.borrow_and_update().cart.clone().unwrap();
        assert_eq!(cart.items[0].quantity, 4);
        assert_eq!(cart.total_items, 4);
    }

    #[tokio::test]
    async fn test_huge_quantity_does_not_overflow_totals() {
        let (store, backend, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let item_id = store.cart().unwrap().items[0].id;

        backend.fail(Endpoint::UpdateItem, 400, "Insufficient stock");
        let err = store.update_quantity(item_id, u32::MAX).await.unwrap_err();

        assert_eq!(err.user_message(), UPDATE_FAILED);
        assert_eq!(store.cart().unwrap().total_items, 2);
    }

    #[test]
    fn test_apply_quantity_saturates() {
        let mut cart = Cart {
            total_items: 5,
            ..Cart::default()
        };
        cart.items.push(crate::api::CartItem {
            id: CartItemId::new(1),
            variation: crate::api::CartItemVariation {
                id: VariationId::new(5),
                product_name: "Lamu Sofa".to_string(),
                product_image: None,
                attributes: sofahub_core::Attributes::new(),
            },
            quantity: 2,
            unit_price: sofahub_core::Price::from_shillings(1_000),
            total_price: sofahub_core::Price::from_shillings(2_000),
        });

        apply_quantity(&mut cart, CartItemId::new(1), u32::MAX);
        assert_eq!(cart.total_items, u32::MAX);
        assert_eq!(cart.items[0].quantity, u32::MAX);
    }

    // =========================================================================
    // Remove Tests
    // =========================================================================

    #[tokio::test]
    async fn test_remove_item() {
        let (store, _, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        store.add_to_cart(VariationId::new(7), 1).await.unwrap();
        let item_id = store.cart().unwrap().items[0].id;

        store.remove_from_cart(item_id).await.unwrap();
        let cart = store.cart().unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items, 1);
    }

    #[tokio::test]
    async fn test_remove_failure_restores_exact_snapshot() {
        let (store, backend, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        store.add_to_cart(VariationId::new(7), 1).await.unwrap();
        let before = store.cart().unwrap();

        backend.fail(Endpoint::RemoveItem, 500, "Internal Server Error");
        let err = store.remove_from_cart(before.items[0].id).await.unwrap_err();

        assert_eq!(err.user_message(), REMOVE_FAILED);
        let state = store.state();
        assert_eq!(state.cart.unwrap(), before);
        assert_eq!(state.error.as_deref(), Some(REMOVE_FAILED));
    }

    #[test]
    fn test_apply_removal_decrements_total_items() {
        let mut cart = Cart::default();
        apply_removal(&mut cart, CartItemId::new(1));
        assert_eq!(cart.total_items, 0);
    }

    // =========================================================================
    // Clear Tests
    // =========================================================================

    #[tokio::test]
    async fn test_clear_cart_rotates_session() {
        let (store, _, _) = store();
        store.add_to_cart(VariationId::new(5), 2).await.unwrap();
        let old_session = store.get_session_id();

        store.clear_cart().await.unwrap();
        store.refresh_cart().await.unwrap();

        assert_ne!(store.get_session_id(), old_session);
        assert!(store.cart().unwrap().items.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_error() {
        let (store, backend, _) = store();
        backend.fail(Endpoint::GetCart, 500, "boom");
        let _ = store.refresh_cart().await;
        assert!(store.state().error.is_some());

        store.clear_error();
        assert!(store.state().error.is_none());
    }
}
