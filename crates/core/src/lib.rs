//! SofaHub Core - Shared types library.
//!
//! This crate provides common types used across all SofaHub components:
//! - `storefront` - Catalog, cart, and checkout client for the SofaHub API
//! - `cli` - Terminal shopper built on the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, phone numbers,
//!   order statuses, and product attribute values

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
