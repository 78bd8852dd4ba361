//! Server-side cart state.
//!
//! The pure line-item logic lives in [`tienda_core::Cart`]. This module
//! binds it to a storage backend and a change channel.

pub mod storage;
pub mod store;

pub use storage::{
    CART_STORAGE_VERSION, CartStorage, MemoryCartStorage, PersistedCart, SessionCartStorage,
    StorageError,
};
pub use store::{CartSnapshot, CartStore};
