//! Display-only cart totals: the M-Pesa deposit split and delivery estimate.
//!
//! Delivery is paid in person and never added to the amount collected
//! online.

use sofahub_core::Price;

use crate::api::Cart;

/// Subtotal (in shillings) from which delivery within Nairobi is free.
pub const FREE_DELIVERY_THRESHOLD: i64 = 50_000;

/// Reference delivery fee (in shillings) shown below the threshold.
pub const DELIVERY_ESTIMATE: i64 = 2_000;

/// How delivery will be charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Free within Nairobi.
    Free,
    /// Paid to the driver; `estimate` is indicative only.
    OnDelivery { estimate: Price },
}

impl Delivery {
    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        if subtotal >= Price::from_shillings(FREE_DELIVERY_THRESHOLD) {
            Self::Free
        } else {
            Self::OnDelivery {
                estimate: Price::from_shillings(DELIVERY_ESTIMATE),
            }
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Free => "FREE (Nairobi)",
            Self::OnDelivery { .. } => "Paid on delivery",
        }
    }
}

/// Totals shown beside the cart and on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub total_items: u32,
    pub subtotal: Price,
    /// Collected through M-Pesa when the order is placed.
    pub deposit: Price,
    /// Collected on delivery, plus any delivery fee.
    pub balance: Price,
    pub delivery: Delivery,
}

impl CartSummary {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            total_items: cart.total_items,
            subtotal: cart.subtotal,
            deposit: cart.subtotal.deposit(),
            balance: cart.subtotal.balance(),
            delivery: Delivery::for_subtotal(cart.subtotal),
        }
    }
}
