//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the persisted cart (`{state, version}` envelope).
    pub const CART_STORAGE: &str = "cart-storage";
}
