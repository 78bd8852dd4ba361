//! The cart store: state, operations, persistence and change notification.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tienda_core::{Cart, CartItem, CartNotification, Product, ProductId};
use tokio::sync::watch;

use super::storage::{CART_STORAGE_VERSION, CartStorage, PersistedCart};

/// Everything a cart view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub notification: Option<CartNotification>,
}

/// A shopper's cart bound to its storage.
///
/// Every operation replaces the state and publishes a [`CartSnapshot`] to
/// subscribers. Changes are written to storage only after [`CartStore::load`]
/// has run, so a write can never clobber a cart that has not been read yet.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    notification: Option<CartNotification>,
    hydrated: bool,
    tx: watch::Sender<CartSnapshot>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create an empty, not yet hydrated store.
    #[must_use]
    pub fn new(storage: S) -> Self {
        let (tx, _rx) = watch::channel(CartSnapshot::default());
        Self {
            storage,
            cart: Cart::new(),
            notification: None,
            hydrated: false,
            tx,
        }
    }

    /// Create a store and rehydrate it from storage.
    pub async fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load().await;
        store
    }

    /// Rehydrate from storage.
    ///
    /// Unreadable or wrong-version payloads are logged and ignored.
    pub async fn load(&mut self) {
        match self.storage.load().await {
            Ok(Some(persisted)) if persisted.version == CART_STORAGE_VERSION => {
                self.cart = persisted.state;
            }
            Ok(Some(persisted)) => {
                tracing::warn!(
                    version = persisted.version,
                    expected = CART_STORAGE_VERSION,
                    "Discarding persisted cart with unsupported version"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart, starting empty");
            }
        }

        self.hydrated = true;
        self.publish();
    }

    /// Whether the initial load has completed.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add `quantity` units of a product and return the notification.
    pub async fn add_item(&mut self, product: &Product, quantity: i64) -> CartNotification {
        self.add_item_at(product, quantity, Utc::now()).await
    }

    /// [`CartStore::add_item`] with an explicit clock.
    pub async fn add_item_at(
        &mut self,
        product: &Product,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CartNotification {
        let in_cart = self.cart.add_item(product, quantity);
        let notification = CartNotification::added(product, in_cart, now);
        self.notification = Some(notification.clone());

        tracing::debug!(product_id = %product.id, quantity, in_cart, "Added to cart");
        self.commit().await;
        notification
    }

    /// Remove a line. No-op for unknown ids.
    pub async fn remove_item(&mut self, product_id: &ProductId) {
        self.cart.remove_item(product_id);
        self.commit().await;
    }

    /// Set a line's quantity; zero or less removes it.
    pub async fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        self.cart.update_quantity(product_id, quantity);
        self.commit().await;
    }

    /// Remove every line. The drawer flag is untouched.
    pub async fn clear_cart(&mut self) {
        self.cart.clear();
        self.commit().await;
    }

    /// Flip the drawer and return the new visibility.
    pub async fn toggle_drawer(&mut self) -> bool {
        let open = self.cart.toggle_drawer();
        self.commit().await;
        open
    }

    /// Drop the notification before it expires.
    pub fn clear_notification(&mut self) {
        self.notification = None;
        self.publish();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Whether the drawer is open.
    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.cart.is_drawer_open()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Sum of `price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    /// Quantity of one product in the cart (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.cart.quantity_of(product_id)
    }

    /// The notification, unless it has expired.
    #[must_use]
    pub fn notification(&self) -> Option<&CartNotification> {
        self.notification_at(Utc::now())
    }

    /// The notification as of `now`.
    #[must_use]
    pub fn notification_at(&self, now: DateTime<Utc>) -> Option<&CartNotification> {
        self.notification.as_ref().filter(|n| !n.is_expired_at(now))
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }

    /// Current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart: self.cart.clone(),
            notification: self.notification.clone(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn commit(&mut self) {
        self.persist().await;
        self.publish();
    }

    async fn persist(&self) {
        if !self.hydrated {
            tracing::debug!("Cart not hydrated yet, skipping persist");
            return;
        }

        let persisted = PersistedCart::current(self.cart.clone());
        if let Err(e) = self.storage.save(&persisted).await {
            tracing::error!(error = %e, "Failed to persist cart");
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}
