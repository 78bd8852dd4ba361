//! Where cart state lives between requests.
//!
//! The persisted layout matches the browser-side store the storefront grew
//! out of, so existing sessions keep their carts:
//!
//! ```json
//! {"state": {"items": [...], "isDrawerOpen": false}, "version": 0}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tienda_core::Cart;
use tokio::sync::Mutex;
use tower_sessions::Session;

use crate::models::session::keys;

/// Version written with every persisted cart.
pub const CART_STORAGE_VERSION: u32 = 0;

/// Versioned envelope around the persisted part of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCart {
    pub state: Cart,
    pub version: u32,
}

impl PersistedCart {
    /// Wrap a cart with the current version.
    #[must_use]
    pub const fn current(state: Cart) -> Self {
        Self {
            state,
            version: CART_STORAGE_VERSION,
        }
    }
}

/// Errors reading or writing persisted carts.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backing store for one shopper's cart.
pub trait CartStorage {
    /// Read the persisted cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the payload is unreadable.
    async fn load(&self) -> Result<Option<PersistedCart>, StorageError>;

    /// Replace the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn save(&self, cart: &PersistedCart) -> Result<(), StorageError>;
}

/// Cart storage in the shopper's session under `cart-storage`.
#[derive(Debug, Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        Ok(self.session.get::<PersistedCart>(keys::CART_STORAGE).await?)
    }

    async fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        self.session.insert(keys::CART_STORAGE, cart).await?;
        Ok(())
    }
}

/// In-process cart storage holding the serialized JSON.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-filled with a raw payload.
    #[must_use]
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(json.into()))),
        }
    }

    /// The raw payload currently stored.
    pub async fn raw(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }
}

impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> Result<Option<PersistedCart>, StorageError> {
        let slot = self.slot.lock().await;
        match slot.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, cart: &PersistedCart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        *self.slot.lock().await = Some(json);
        Ok(())
    }
}
