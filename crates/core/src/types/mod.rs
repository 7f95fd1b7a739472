//! Core types for SofaHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attribute;
pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;

pub use attribute::{AttributeValue, Attributes};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{KenyanPhone, PhoneError, PhoneRule};
pub use price::Price;
pub use status::OrderStatus;
