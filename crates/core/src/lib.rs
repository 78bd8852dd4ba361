//! Tienda Core - Shared catalog and cart types.
//!
//! This crate provides the types shared by the storefront and its tests:
//! - `storefront` - Public-facing catalog and cart
//! - `integration-tests` - Store, catalog and router tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no session
//! access, no HTTP clients. Cart mutations live here so they can be tested
//! without a runtime; persistence and notifications are layered on top by
//! the storefront's `CartStore`.
//!
//! # Modules
//!
//! - [`types`] - Product, price, cart and quantity types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
