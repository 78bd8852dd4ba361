//! Core types for Tienda.
//!
//! This module provides the canonical product shape, the cart line-item
//! container and the small value types around them.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;

pub use cart::{ADDED_TO_CART_MESSAGE, Cart, CartItem, CartNotification, NOTIFICATION_TTL_MS};
pub use id::ProductId;
pub use price::Price;
pub use product::{FALLBACK_RATING, MAX_RATING, Product, clamp_rating};
pub use quantity::{MIN_QUANTITY, ProductQuantity, QuantityStep};
