//! Checkout flow.
//!
//! A four-step linear flow: customer info, shipping, payment, review. Each
//! step's form is validated before the flow advances, and the review step
//! ends in [`CheckoutFlow::place_order`], which creates the order, starts the
//! M-Pesa deposit prompt, and rotates the cart session.

mod forms;

pub use forms::{
    CheckoutData, CustomerInfo, Field, KENYAN_COUNTIES, PaymentInfo, PaymentMethod,
    ShippingAddress, ValidationErrors,
};

use sofahub_core::{KenyanPhone, OrderId, PhoneRule};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiClient, ApiError, CartApi, CheckoutRequest, Order, OrderApi};
use crate::cart::{CartState, CartStore};

// =============================================================================
// Steps
// =============================================================================

/// Checkout steps, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    #[default]
    CustomerInfo = 1,
    Shipping = 2,
    Payment = 3,
    Review = 4,
}

impl CheckoutStep {
    pub const ALL: [Self; 4] = [Self::CustomerInfo, Self::Shipping, Self::Payment, Self::Review];

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CustomerInfo => "Customer Info",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CustomerInfo => "Your contact details",
            Self::Shipping => "Delivery address",
            Self::Payment => "M-Pesa payment",
            Self::Review => "Confirm your order",
        }
    }

    const fn following(self) -> Option<Self> {
        match self {
            Self::CustomerInfo => Some(Self::Shipping),
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    const fn preceding(self) -> Option<Self> {
        match self {
            Self::CustomerInfo => None,
            Self::Shipping => Some(Self::CustomerInfo),
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Where the shopper should be sent next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Cart,
    OrderConfirmation(OrderId),
}

impl Navigation {
    /// Storefront path for this destination.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Cart => "/cart".to_string(),
            Self::OrderConfirmation(id) => format!("/order-confirmation/{id}"),
        }
    }
}

/// Whether checkout can be shown for the current cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutGate {
    /// The first cart load has not finished.
    Loading,
    /// The cart is missing or empty.
    RedirectToCart,
    Ready,
}

impl CheckoutGate {
    #[must_use]
    pub fn for_cart(state: &CartState) -> Self {
        match &state.cart {
            None if state.is_loading => Self::Loading,
            Some(cart) if !cart.is_empty() => Self::Ready,
            _ => Self::RedirectToCart,
        }
    }

    /// Redirect target, if checkout cannot be shown.
    #[must_use]
    pub const fn redirect(self) -> Option<Navigation> {
        match self {
            Self::RedirectToCart => Some(Navigation::Cart),
            Self::Loading | Self::Ready => None,
        }
    }
}

/// Errors from moving between steps.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The action is not available at the current step.
    #[error("not available at step {0:?}")]
    WrongStep(CheckoutStep),
}

/// A successfully placed order.
#[derive(Debug, Clone)]
pub struct OrderPlaced {
    pub order: Order,
    pub navigation: Navigation,
}

impl OrderPlaced {
    #[must_use]
    pub const fn title(&self) -> &'static str {
        "Order placed successfully!"
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Your order #{} has been placed. Check your phone for M-Pesa prompt to complete deposit payment.",
            self.order.id
        )
    }
}

/// A user-facing order placement failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{title}: {message}")]
pub struct PlaceOrderError {
    pub title: &'static str,
    pub message: String,
}

impl PlaceOrderError {
    fn missing_information() -> Self {
        Self {
            title: "Missing information",
            message: "Please complete all checkout steps before placing your order.".to_string(),
        }
    }

    fn invalid_phone() -> Self {
        Self {
            title: "Invalid phone number",
            message: "Please enter a valid Kenyan phone number (e.g., +254 700 123 456 or 0700 123 456)."
                .to_string(),
        }
    }

    fn order_failed(error: &ApiError) -> Self {
        Self {
            title: "Order failed",
            message: failure_message(&error.to_string()),
        }
    }
}

/// Map an order creation error to a shopper-facing message.
fn failure_message(raw: &str) -> String {
    if raw.is_empty() {
        "There was an error processing your order. Please try again.".to_string()
    } else if raw.contains("phone") {
        "Please check your phone number and try again.".to_string()
    } else if raw.contains("cart") {
        "Your cart appears to be empty. Please add items and try again.".to_string()
    } else if raw.contains("payment") {
        "Payment initiation failed. Please check your phone number and try again.".to_string()
    } else {
        raw.to_string()
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Drives one checkout from contact details to order placement.
///
/// Form drafts can be edited freely; a step's data is only committed when
/// [`next`](Self::next) validates it.
pub struct CheckoutFlow<O = ApiClient> {
    api: O,
    step: CheckoutStep,
    data: CheckoutData,
    customer: CustomerInfo,
    shipping: ShippingAddress,
    payment: PaymentInfo,
    errors: ValidationErrors,
    processing: watch::Sender<bool>,
}

impl<O: OrderApi> CheckoutFlow<O> {
    #[must_use]
    pub fn new(api: O) -> Self {
        Self {
            api,
            step: CheckoutStep::default(),
            data: CheckoutData::default(),
            customer: CustomerInfo::default(),
            shipping: ShippingAddress::default(),
            payment: PaymentInfo::default(),
            errors: ValidationErrors::default(),
            processing: watch::Sender::new(false),
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Details committed so far.
    #[must_use]
    pub const fn data(&self) -> &CheckoutData {
        &self.data
    }

    /// Validation errors from the last rejected `next()`.
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        *self.processing.borrow()
    }

    /// Follow the processing flag while an order is being placed.
    #[must_use]
    pub fn subscribe_processing(&self) -> watch::Receiver<bool> {
        self.processing.subscribe()
    }

    // =========================================================================
    // Form Drafts
    // =========================================================================

    pub fn set_customer(&mut self, customer: CustomerInfo) {
        self.customer = customer;
    }

    pub fn set_shipping(&mut self, shipping: ShippingAddress) {
        self.shipping = shipping;
    }

    pub fn set_mpesa_phone(&mut self, mpesa_phone: impl Into<String>) {
        self.payment.mpesa_phone = mpesa_phone.into();
    }

    #[must_use]
    pub const fn customer_draft(&self) -> &CustomerInfo {
        &self.customer
    }

    #[must_use]
    pub const fn shipping_draft(&self) -> &ShippingAddress {
        &self.shipping
    }

    #[must_use]
    pub const fn payment_draft(&self) -> &PaymentInfo {
        &self.payment
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Validate the current step's form, commit it, and advance.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` with per-field messages if the
    /// form is invalid, or `CheckoutError::WrongStep` at the review step.
    pub fn next(&mut self) -> Result<CheckoutStep, CheckoutError> {
        let Some(following) = self.step.following() else {
            return Err(CheckoutError::WrongStep(self.step));
        };

        let validated = match self.step {
            CheckoutStep::CustomerInfo => self.customer.validate(),
            CheckoutStep::Shipping => self.shipping.validate(),
            CheckoutStep::Payment => self.payment.validate(),
            CheckoutStep::Review => Ok(()),
        };

        if let Err(errors) = validated {
            self.errors = errors.clone();
            return Err(CheckoutError::Validation(errors));
        }

        match self.step {
            CheckoutStep::CustomerInfo => self.data.customer = Some(self.customer.clone()),
            CheckoutStep::Shipping => self.data.shipping_address = Some(self.shipping.clone()),
            CheckoutStep::Payment => self.data.mpesa_phone = Some(self.payment.mpesa_phone.clone()),
            CheckoutStep::Review => {}
        }

        self.errors = ValidationErrors::default();
        self.step = following;
        Ok(following)
    }

    /// Go back one step. Does nothing at the first step.
    pub fn previous(&mut self) -> CheckoutStep {
        if let Some(preceding) = self.step.preceding() {
            self.step = preceding;
        }
        self.step
    }

    /// Commit the customer form and advance.
    ///
    /// # Errors
    ///
    /// See [`next`](Self::next).
    pub fn submit_customer(&mut self, customer: CustomerInfo) -> Result<CheckoutStep, CheckoutError> {
        self.expect_step(CheckoutStep::CustomerInfo)?;
        self.set_customer(customer);
        self.next()
    }

    /// Commit the shipping form and advance.
    ///
    /// # Errors
    ///
    /// See [`next`](Self::next).
    pub fn submit_shipping(&mut self, shipping: ShippingAddress) -> Result<CheckoutStep, CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;
        self.set_shipping(shipping);
        self.next()
    }

    /// Commit the M-Pesa number and advance to review.
    ///
    /// # Errors
    ///
    /// See [`next`](Self::next).
    pub fn submit_payment(&mut self, mpesa_phone: impl Into<String>) -> Result<CheckoutStep, CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        self.set_mpesa_phone(mpesa_phone);
        self.next()
    }

    fn expect_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep(self.step))
        }
    }

    /// Check that checkout can be shown for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when the shopper should be sent
    /// back to the cart.
    pub fn guard<A: CartApi>(&self, cart: &CartStore<A>) -> Result<(), CheckoutError> {
        match CheckoutGate::for_cart(&cart.state()) {
            CheckoutGate::RedirectToCart => Err(CheckoutError::EmptyCart),
            CheckoutGate::Loading | CheckoutGate::Ready => Ok(()),
        }
    }

    // =========================================================================
    // Order Placement
    // =========================================================================

    /// Place the order for the cart's session.
    ///
    /// On success the cart session is rotated and the shopper is sent to the
    /// order confirmation page. On failure the flow stays on the review step
    /// and the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a `PlaceOrderError` carrying the title and message to show.
    /// Incomplete details and invalid phone numbers are rejected without a
    /// network request.
    #[instrument(skip(self, cart), fields(step = self.step.number()))]
    pub async fn place_order<A: CartApi>(
        &mut self,
        cart: &CartStore<A>,
    ) -> Result<OrderPlaced, PlaceOrderError> {
        let request = self.build_request(&cart.get_session_id())?;

        self.processing.send_replace(true);
        let result = self.api.checkout(&request).await;
        self.processing.send_replace(false);

        match result {
            Ok(order) => {
                info!(order_id = %order.id, order_number = %order.order_number, "Order placed");

                if let Err(e) = cart.clear_cart().await {
                    warn!(error = %e, "Failed to reload cart after order placement");
                }

                Ok(OrderPlaced {
                    navigation: Navigation::OrderConfirmation(order.id),
                    order,
                })
            }
            Err(e) => {
                error!(error = %e, "Checkout failed");
                Err(PlaceOrderError::order_failed(&e))
            }
        }
    }

    fn build_request(&self, session_id: &str) -> Result<CheckoutRequest, PlaceOrderError> {
        let (Some(customer), Some(shipping), Some(mpesa_phone)) = (
            self.data.customer.as_ref(),
            self.data.shipping_address.as_ref(),
            self.data.mpesa_phone.as_deref(),
        ) else {
            return Err(PlaceOrderError::missing_information());
        };

        if self.step != CheckoutStep::Review {
            return Err(PlaceOrderError::missing_information());
        }

        let mpesa_phone = KenyanPhone::parse(mpesa_phone, PhoneRule::Submit)
            .map_err(|_| PlaceOrderError::invalid_phone())?;

        Ok(CheckoutRequest {
            customer_name: customer.name.trim().to_string(),
            customer_email: customer.email.trim().to_string(),
            customer_phone: customer.phone.trim().to_string(),
            mpesa_phone: mpesa_phone.as_str().to_string(),
            shipping_address: shipping.street.trim().to_string(),
            shipping_city: shipping.city.trim().to_string(),
            shipping_zip_code: shipping.zip_code(),
            session_id: session_id.to_string(),
        })
    }
}
