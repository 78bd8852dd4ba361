//! Product grid route handlers.
//!
//! The catalog page renders skeleton cards and asks for the grid fragment
//! on load, so each page mount costs exactly one catalog fetch.

use std::fmt::Write as _;

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::IntoResponse};
use serde::Deserialize;
use tienda_core::{MAX_RATING, Price, Product, ProductQuantity, QuantityStep};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, SessionCartStorage};
use crate::catalog::ProductFeed;
use crate::state::AppState;

/// Skeleton cards shown while the grid loads.
pub const SKELETON_CARD_COUNT: usize = 10;

/// Cards whose images load eagerly.
pub const PRIORITY_IMAGE_COUNT: usize = 10;

/// Star slots in a rating.
const STAR_SLOTS: usize = 5;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    /// Product id made safe for use in element ids.
    pub dom_id: String,
    pub name: String,
    /// Formatted price, e.g. "$19.99".
    pub price: String,
    /// Raw decimal price for the add-to-cart form.
    pub price_value: String,
    pub image_url: String,
    pub rating_value: String,
    pub full_stars: usize,
    pub empty_stars: usize,
    pub review_count: Option<u32>,
    /// Quantity already in the cart.
    pub in_cart: u32,
    /// Load the image eagerly.
    pub priority: bool,
    pub quantity: QuantityView,
}

impl ProductCardView {
    /// Build a card for the product at `position` in the grid.
    #[must_use]
    pub fn new(product: &Product, position: usize, in_cart: u32) -> Self {
        let full_stars = full_stars(product.rating);
        let dom_id = dom_id(product.id.as_str());

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: Price::usd(product.price).display(),
            price_value: product.price.normalize().to_string(),
            image_url: product.image_url.clone(),
            rating_value: product.rating.to_string(),
            full_stars,
            empty_stars: STAR_SLOTS - full_stars,
            review_count: product.review_count,
            in_cart,
            priority: position < PRIORITY_IMAGE_COUNT,
            quantity: QuantityView::new(&dom_id, ProductQuantity::default()),
            dom_id,
        }
    }

    /// The in-cart badge rendered inside the card.
    #[must_use]
    pub fn badge(&self) -> BadgeView {
        BadgeView {
            dom_id: self.dom_id.clone(),
            in_cart: self.in_cart,
            oob: false,
        }
    }
}

/// In-cart badge display data.
#[derive(Clone)]
pub struct BadgeView {
    pub dom_id: String,
    pub in_cart: u32,
    /// Render as an HTMX out-of-band swap.
    pub oob: bool,
}

/// Card-local quantity stepper display data.
#[derive(Clone)]
pub struct QuantityView {
    pub dom_id: String,
    pub value: u32,
    pub can_decrement: bool,
    /// Render as an HTMX out-of-band swap.
    pub oob: bool,
}

impl QuantityView {
    #[must_use]
    pub fn new(dom_id: &str, quantity: ProductQuantity) -> Self {
        Self {
            dom_id: dom_id.to_string(),
            value: quantity.get(),
            can_decrement: quantity.can_decrement(),
            oob: false,
        }
    }

    /// The stepper back at its minimum, swapped out of band after an add.
    #[must_use]
    pub fn reset(dom_id: &str) -> Self {
        Self {
            oob: true,
            ..Self::new(dom_id, ProductQuantity::default())
        }
    }
}

/// Number of filled stars for a rating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=STAR_SLOTS first
fn full_stars(rating: f64) -> usize {
    if !rating.is_finite() {
        return 0;
    }
    rating.floor().clamp(0.0, MAX_RATING) as usize
}

/// Element-id-safe form of a product id.
///
/// Hex-encodes the bytes so distinct ids never collide.
#[must_use]
pub fn dom_id(id: &str) -> String {
    id.bytes().fold(String::from("p-"), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "products/grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
    pub error: Option<String>,
}

/// Quantity stepper fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "products/quantity.html")]
pub struct QuantityTemplate {
    pub quantity: QuantityView,
}

/// Quantity stepper form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: String,
    pub quantity: u32,
    pub step: QuantityStep,
}

/// Render the product grid (HTMX).
///
/// Fetches the catalog once. Failures are shown in place of the grid.
#[instrument(skip(state, session))]
pub async fn grid(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    tracing::debug!(source = state.catalog().name(), "Loading product grid");
    let cart = CartStore::open(SessionCartStorage::new(session)).await;

    let mut feed = ProductFeed::new();
    feed.load(state.catalog()).await;

    let products = feed
        .products()
        .iter()
        .enumerate()
        .map(|(position, product)| {
            ProductCardView::new(product, position, cart.quantity_of(&product.id))
        })
        .collect();

    ProductGridTemplate {
        products,
        error: feed.error().map(String::from),
    }
}

/// Step a card's quantity (HTMX).
#[instrument]
pub async fn quantity(Form(form): Form<QuantityForm>) -> impl IntoResponse {
    let quantity = ProductQuantity::new(form.quantity).apply(form.step);

    QuantityTemplate {
        quantity: QuantityView::new(&dom_id(&form.product_id), quantity),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tienda_core::ProductId;

    use super::*;

    fn product(rating: f64) -> Product {
        Product {
            id: ProductId::new("1"),
            name: "Backpack".to_string(),
            price: Decimal::new(1095, 1),
            image_url: "https://img.example/1.jpg".to_string(),
            rating,
            review_count: Some(120),
        }
    }

    #[test]
    fn test_card_formatting() {
        let card = ProductCardView::new(&product(3.9), 0, 2);

        assert_eq!(card.price, "$109.50");
        assert_eq!(card.price_value, "109.5");
        assert_eq!(card.full_stars, 3);
        assert_eq!(card.empty_stars, 2);
        assert_eq!(card.in_cart, 2);
        assert_eq!(card.quantity.value, 1);
        assert!(!card.quantity.can_decrement);
        assert!(card.priority);
    }

    #[test]
    fn test_priority_limited_to_first_cards() {
        assert!(ProductCardView::new(&product(4.0), PRIORITY_IMAGE_COUNT - 1, 0).priority);
        assert!(!ProductCardView::new(&product(4.0), PRIORITY_IMAGE_COUNT, 0).priority);
    }

    #[test]
    fn test_quantity_reset_is_out_of_band() {
        let html = QuantityTemplate {
            quantity: QuantityView::reset("p-31"),
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains(r#"id="qty-p-31""#));
        assert!(html.contains(r#"hx-swap-oob="true""#));
        assert!(html.contains(r#"value="1""#));
    }

    #[test]
    fn test_full_stars_bounds() {
        assert_eq!(full_stars(0.0), 0);
        assert_eq!(full_stars(4.99), 4);
        assert_eq!(full_stars(5.0), 5);
        assert_eq!(full_stars(12.0), 5);
        assert_eq!(full_stars(f64::NAN), 0);
    }

    #[test]
    fn test_dom_id_is_element_safe() {
        assert_eq!(dom_id("1"), "p-31");
        assert_eq!(dom_id("A b"), "p-412062");
        assert_ne!(dom_id("a-b"), dom_id("a b"));
    }

    #[test]
    fn test_grid_renders_error_message() {
        let html = ProductGridTemplate {
            products: Vec::new(),
            error: Some("HTTP error! status: 500".to_string()),
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains("HTTP error! status: 500"));
        assert!(!html.contains("No products found."));
    }

    #[test]
    fn test_grid_renders_empty_state() {
        let html = ProductGridTemplate {
            products: Vec::new(),
            error: None,
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains("No products found."));
    }

    #[test]
    fn test_grid_renders_cards() {
        let html = ProductGridTemplate {
            products: vec![ProductCardView::new(&product(3.9), 0, 0)],
            error: None,
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains("Backpack"));
        assert!(html.contains("$109.50"));
        assert!(html.contains("(120)"));
        assert!(html.contains(r#"loading="eager""#));
    }
}
