//! Card-local "how many to add" quantity.

use serde::{Deserialize, Serialize};

/// Smallest quantity a product card lets the shopper pick.
pub const MIN_QUANTITY: u32 = 1;

/// A step applied to a [`ProductQuantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityStep {
    Increment,
    Decrement,
}

/// Quantity picked on a product card before adding to the cart.
///
/// Never drops below [`MIN_QUANTITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductQuantity(u32);

impl ProductQuantity {
    /// Create a quantity, raising it to [`MIN_QUANTITY`] if needed.
    #[must_use]
    pub fn new(quantity: u32) -> Self {
        Self(quantity.max(MIN_QUANTITY))
    }

    /// The current value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less, floored at [`MIN_QUANTITY`].
    #[must_use]
    pub fn decrement(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// Apply a step.
    #[must_use]
    pub fn apply(self, step: QuantityStep) -> Self {
        match step {
            QuantityStep::Increment => self.increment(),
            QuantityStep::Decrement => self.decrement(),
        }
    }

    /// Whether decrementing would change the value.
    #[must_use]
    pub const fn can_decrement(self) -> bool {
        self.0 > MIN_QUANTITY
    }
}

impl Default for ProductQuantity {
    fn default() -> Self {
        Self(MIN_QUANTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_raises_to_minimum() {
        assert_eq!(ProductQuantity::new(0).get(), MIN_QUANTITY);
        assert_eq!(ProductQuantity::new(4).get(), 4);
    }

    #[test]
    fn test_decrement_floors_at_minimum() {
        let q = ProductQuantity::new(2).decrement();
        assert_eq!(q.get(), 1);
        assert!(!q.can_decrement());
        assert_eq!(q.decrement().get(), 1);
    }

    #[test]
    fn test_apply_steps() {
        let q = ProductQuantity::default()
            .apply(QuantityStep::Increment)
            .apply(QuantityStep::Increment)
            .apply(QuantityStep::Decrement);
        assert_eq!(q.get(), 2);
        assert!(q.can_decrement());
    }
}
