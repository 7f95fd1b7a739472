//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the SofaHub API.
///
/// Statuses the client does not know about deserialize to
/// [`OrderStatus::Unknown`] so a new backend status never breaks order
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, waiting for the M-Pesa deposit.
    #[default]
    Pending,
    /// Deposit received.
    Confirmed,
    /// Being prepared for delivery.
    Processing,
    /// The M-Pesa deposit failed or was declined.
    PaymentFailed,
    Cancelled,
    Shipped,
    Delivered,
    /// Any status this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Shopper-facing explanation of what happens next.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Confirmed => "Payment confirmed! We'll contact you soon to arrange delivery.",
            Self::Pending => {
                "Waiting for payment confirmation. Please complete the M-Pesa payment on your phone."
            }
            Self::PaymentFailed => "Payment failed. Please try again or contact our support team.",
            Self::Cancelled => {
                "Order was cancelled. Please contact our support team if you need assistance."
            }
            _ => "Processing your order...",
        }
    }

    /// Whether the shopper still needs to complete the M-Pesa prompt.
    #[must_use]
    pub const fn awaiting_payment(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Processing => write!(f, "processing"),
            Self::PaymentFailed => write!(f, "payment_failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "payment_failed" => Ok(Self::PaymentFailed),
            "cancelled" => Ok(Self::Cancelled),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_known_statuses() {
        let status: OrderStatus = serde_json::from_str("\"payment_failed\"").unwrap();
        assert_eq!(status, OrderStatus::PaymentFailed);
        let status: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_deserialize_unknown_status() {
        let status: OrderStatus = serde_json::from_str("\"awaiting_courier\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_display_matches_wire_format() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::PaymentFailed,
            OrderStatus::Cancelled,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_messages() {
        assert!(OrderStatus::Pending.message().contains("M-Pesa"));
        assert_eq!(OrderStatus::Shipped.message(), "Processing your order...");
        assert!(OrderStatus::Pending.awaiting_payment());
        assert!(!OrderStatus::Confirmed.awaiting_payment());
    }
}
