//! In-memory fake of the SofaHub cart and order endpoints for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use sofahub_core::{CartItemId, OrderId, OrderStatus, Price, VariationId};

use crate::api::{
    ApiError, Cart, CartApi, CartItem, CartItemVariation, CheckoutRequest, Order, OrderApi,
    OrderItem,
};

/// Which endpoint a failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetCart,
    AddItem,
    UpdateItem,
    RemoveItem,
    Checkout,
}

#[derive(Debug, Default)]
struct State {
    carts: HashMap<String, Cart>,
    next_item_id: i32,
    next_order_id: i32,
    failures: HashMap<Endpoint, (u16, String)>,
    calls: HashMap<Endpoint, usize>,
    checkouts: Vec<CheckoutRequest>,
}

/// Fake backend with per-endpoint failure injection and call counters.
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call to `endpoint` fail with `status` and `message`.
    pub fn fail(&self, endpoint: Endpoint, status: u16, message: &str) {
        self.lock()
            .failures
            .insert(endpoint, (status, message.to_string()));
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.lock().checkouts.clone()
    }

    /// Seed a session's cart with one line.
    pub fn seed(&self, session_id: &str, variation_id: VariationId, quantity: u32) -> CartItemId {
        let mut state = self.lock();
        insert_item(&mut state, session_id, variation_id, quantity)
    }

    fn begin(&self, endpoint: Endpoint) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
        let mut state = self.lock();
        *state.calls.entry(endpoint).or_insert(0) += 1;
        if let Some((status, message)) = state.failures.get(&endpoint) {
            return Err(ApiError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(state)
    }
}

/// Unit price of a variation in the fake catalog: KSh 1,000 per id.
pub fn unit_price(variation_id: VariationId) -> Price {
    Price::from_shillings(1_000 * i64::from(variation_id.as_i32()))
}

fn insert_item(
    state: &mut State,
    session_id: &str,
    variation_id: VariationId,
    quantity: u32,
) -> CartItemId {
    state.next_item_id += 1;
    let next_id = CartItemId::new(state.next_item_id);
    let cart = state
        .carts
        .entry(session_id.to_string())
        .or_insert_with(|| empty_cart(session_id));

    let id = if let Some(item) = cart
        .items
        .iter_mut()
        .find(|item| item.variation.id == variation_id)
    {
        item.quantity += quantity;
        item.id
    } else {
        cart.items.push(CartItem {
            id: next_id,
            variation: CartItemVariation {
                id: variation_id,
                product_name: format!("Product {variation_id}"),
                product_image: None,
                attributes: sofahub_core::Attributes::new(),
            },
            quantity,
            unit_price: unit_price(variation_id),
            total_price: Price::ZERO,
        });
        next_id
    };

    recompute(cart);
    id
}

fn empty_cart(session_id: &str) -> Cart {
    Cart {
        session_id: session_id.to_string(),
        ..Cart::default()
    }
}

fn recompute(cart: &mut Cart) {
    for item in &mut cart.items {
        item.total_price = item.unit_price.times(item.quantity);
    }
    cart.total_items = cart.items.iter().map(|item| item.quantity).sum();
    cart.subtotal = cart.items.iter().map(|item| item.total_price).sum();
}

fn not_found() -> ApiError {
    ApiError::Api {
        status: 404,
        message: "Cart item not found".to_string(),
    }
}

impl CartApi for FakeBackend {
    async fn get_cart(&self, session_id: &str) -> Result<Cart, ApiError> {
        let state = self.begin(Endpoint::GetCart)?;
        Ok(state
            .carts
            .get(session_id)
            .cloned()
            .unwrap_or_else(|| empty_cart(session_id)))
    }

    async fn add_item(
        &self,
        session_id: &str,
        variation_id: VariationId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let mut state = self.begin(Endpoint::AddItem)?;
        insert_item(&mut state, session_id, variation_id, quantity);
        Ok(())
    }

    async fn update_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let mut state = self.begin(Endpoint::UpdateItem)?;
        let cart = state.carts.get_mut(session_id).ok_or_else(not_found)?;
        let item = cart
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(not_found)?;
        item.quantity = quantity;
        recompute(cart);
        Ok(())
    }

    async fn remove_item(&self, session_id: &str, item_id: CartItemId) -> Result<(), ApiError> {
        let mut state = self.begin(Endpoint::RemoveItem)?;
        let cart = state.carts.get_mut(session_id).ok_or_else(not_found)?;
        cart.items.retain(|item| item.id != item_id);
        recompute(cart);
        Ok(())
    }
}

impl OrderApi for FakeBackend {
    async fn checkout(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        let mut state = self.begin(Endpoint::Checkout)?;
        state.checkouts.push(request.clone());

        let cart = state
            .carts
            .get(&request.session_id)
            .filter(|cart| !cart.is_empty())
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 400,
                message: "cart is empty".to_string(),
            })?;

        state.next_order_id += 1;
        let id = OrderId::new(state.next_order_id);

        Ok(Order {
            id,
            order_number: format!("ORD-{id}"),
            status: OrderStatus::Pending,
            customer_name: request.customer_name.clone(),
            customer_email: request.customer_email.clone(),
            customer_phone: request.customer_phone.clone(),
            shipping_address: request.shipping_address.clone(),
            shipping_city: request.shipping_city.clone(),
            payment_confirmed: false,
            items: cart
                .items
                .iter()
                .map(|item| OrderItem {
                    product_name: item.variation.product_name.clone(),
                    sku: None,
                    attributes: item.variation.attributes.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                })
                .collect(),
            total_items: cart.total_items,
            subtotal: cart.subtotal,
            total: cart.subtotal,
            deposit_amount: Some(cart.subtotal.deposit()),
            remaining_amount: Some(cart.subtotal.balance()),
            created_at: None,
        })
    }
}
