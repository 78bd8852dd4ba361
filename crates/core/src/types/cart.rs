//! Cart line items and their pure mutation logic.
//!
//! [`Cart`] is the persisted part of the cart state: the line items and the
//! drawer flag. It never fails: non-positive quantities remove lines and
//! unknown ids are ignored. Totals are derived on every read.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::product::Product;

/// How long an add-to-cart notification stays visible, in milliseconds.
pub const NOTIFICATION_TTL_MS: i64 = 3_000;

/// Message shown in the add-to-cart notification.
pub const ADDED_TO_CART_MESSAGE: &str = "Added to cart";

/// A product plus the quantity of it held in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// The product, copied at the time it was added.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in the cart (at least 1 while the line exists).
    pub quantity: u32,
}

impl CartItem {
    /// The product id of this line.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart line items plus the drawer visibility flag.
///
/// Invariant: at most one [`CartItem`] per distinct product id, and every
/// line has a quantity of at least 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default)]
    is_drawer_open: bool,
}

impl Cart {
    /// Create an empty cart with the drawer closed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            is_drawer_open: false,
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.is_drawer_open
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by product id.
    #[must_use]
    pub fn get_item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id() == product_id)
    }

    /// Quantity of a product currently in the cart (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.get_item(product_id).map_or(0, |i| i.quantity)
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line has `quantity` added to it, floored at 0; the line is
    /// removed when the result reaches 0. A missing product is appended only
    /// when `quantity` is positive.
    ///
    /// Returns the quantity of the product in the cart afterwards.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> u32 {
        if let Some(pos) = self.items.iter().position(|i| i.id() == &product.id) {
            let Some(existing) = self.items.get_mut(pos) else {
                return 0;
            };
            let new_quantity = clamp_quantity(i64::from(existing.quantity).saturating_add(quantity));
            if new_quantity == 0 {
                self.items.remove(pos);
            } else {
                existing.quantity = new_quantity;
            }
            return new_quantity;
        }

        let new_quantity = clamp_quantity(quantity);
        if new_quantity > 0 {
            self.items.push(CartItem {
                product: product.clone(),
                quantity: new_quantity,
            });
        }
        new_quantity
    }

    /// Remove a line. Returns `true` if a line was removed.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.id() != product_id);
        self.items.len() < len_before
    }

    /// Set a line's quantity exactly.
    ///
    /// A quantity of 0 or less removes the line. Unknown ids are ignored.
    /// Returns `true` if the cart changed.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let quantity = clamp_quantity(quantity);
        match self.items.iter_mut().find(|i| i.id() == product_id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove all lines. The drawer flag is left as is.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Flip the drawer flag and return the new value.
    pub const fn toggle_drawer(&mut self) -> bool {
        self.is_drawer_open = !self.is_drawer_open;
        self.is_drawer_open
    }

    /// Total item count (sum of quantities).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Clamp a signed quantity into the `u32` range, flooring at 0.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

/// Transient summary of the last add-to-cart operation.
///
/// Never persisted. Carries its own expiry so readers can drop it without
/// a timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNotification {
    /// Headline, e.g. "Added to cart".
    pub message: String,
    /// Name of the product that was added.
    pub product_name: String,
    /// Image of the product that was added.
    pub image_url: String,
    /// Quantity of the product in the cart after the operation.
    pub quantity: u32,
    /// When the notification stops being shown.
    pub expires_at: DateTime<Utc>,
}

impl CartNotification {
    /// Build the notification for an add-to-cart operation.
    #[must_use]
    pub fn added(product: &Product, quantity: u32, now: DateTime<Utc>) -> Self {
        Self {
            message: ADDED_TO_CART_MESSAGE.to_string(),
            product_name: product.name.clone(),
            image_url: product.image_url.clone(),
            quantity,
            expires_at: now + Duration::milliseconds(NOTIFICATION_TTL_MS),
        }
    }

    /// Whether the notification has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Milliseconds left until expiry at `now` (0 once expired).
    #[must_use]
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_milliseconds().max(0)
    }
}
