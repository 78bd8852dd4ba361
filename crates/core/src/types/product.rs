//! The canonical catalog product.
//!
//! Every catalog source is adapted into this one shape before it reaches the
//! views or the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Highest rating a product can carry.
pub const MAX_RATING: f64 = 5.0;

/// Rating used when a source does not report one.
pub const FALLBACK_RATING: f64 = 0.0;

/// A catalog product.
///
/// Immutable once built by a catalog adapter. Embedded by value into cart
/// line items, so the cart keeps rendering even if the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier (unique within a catalog).
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Image URL; empty when the source has none.
    pub image_url: String,
    /// Average rating in `0.0..=5.0`.
    pub rating: f64,
    /// Number of reviews behind the rating, when the source reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
}

impl Product {
    /// Whether the product has an image to show.
    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}

/// Clamp a raw rating into `0.0..=MAX_RATING`.
///
/// Non-finite values fall back to [`FALLBACK_RATING`].
#[must_use]
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_finite() {
        rating.clamp(0.0, MAX_RATING)
    } else {
        FALLBACK_RATING
    }
}
