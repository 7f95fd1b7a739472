//! SofaHub Storefront library.
//!
//! Client-side storefront logic for the SofaHub furniture shop, backed by
//! the SofaHub REST API:
//!
//! - [`api`] - HTTP client with an in-memory response cache
//! - [`cart`] - Cart state store with optimistic updates
//! - [`variations`] - Variation resolution for product option pickers
//! - [`checkout`] - Four-step checkout flow ending in an M-Pesa deposit
//! - [`catalog`] - Filter and sort selections as API query parameters
//! - [`storage`] - Client-local key/value storage for the cart session
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod storage;
pub mod variations;

#[cfg(test)]
mod testing;
