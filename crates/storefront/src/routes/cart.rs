//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Each request opens the shopper's cart from the session, applies one
//! operation and lets the store write it back.
//!
//! Add-to-cart rebuilds the product from the card's hidden form fields, so
//! name, image and price in the cart are whatever the client posted (a
//! negative price is floored at zero). Nothing is charged from them: the
//! storefront has no checkout.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tienda_core::{
    Cart, CartItem, CartNotification, FALLBACK_RATING, Price, Product, ProductId, clamp_rating,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, SessionCartStorage};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::products::{BadgeView, QuantityView, dom_id};

/// HTMX event fired after every cart change.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    /// Quantity after the "+" button.
    pub quantity_up: u32,
    /// Quantity after the "-" button (0 removes the line).
    pub quantity_down: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.product.name.clone(),
            image_url: item.product.image_url.clone(),
            quantity: item.quantity,
            quantity_up: item.quantity.saturating_add(1),
            quantity_down: item.quantity.saturating_sub(1),
            price: Price::usd(item.product.price).display(),
            line_price: Price::usd(item.line_total()).display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
    /// "product" or "products", matching `item_count`.
    pub product_label: &'static str,
    pub is_drawer_open: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let item_count = cart.item_count();

        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: Price::usd(cart.subtotal()).display(),
            item_count,
            product_label: if item_count == 1 { "product" } else { "products" },
            is_drawer_open: cart.is_drawer_open(),
        }
    }
}

/// Add-to-cart notification display data.
#[derive(Clone)]
pub struct ToastView {
    pub message: String,
    pub product_name: String,
    pub image_url: String,
    pub quantity: u32,
    /// Milliseconds until the toast dismisses itself.
    pub remaining_ms: i64,
}

impl ToastView {
    #[must_use]
    pub fn new(notification: &CartNotification) -> Self {
        Self {
            message: notification.message.clone(),
            product_name: notification.product_name.clone(),
            image_url: notification.image_url.clone(),
            quantity: notification.quantity,
            remaining_ms: notification.remaining_ms(Utc::now()),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Which cart fragment a line operation re-renders.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartFragment {
    #[default]
    Drawer,
    Page,
}

/// Add to cart form data.
///
/// The product travels with the form so the cart never needs to look it up.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub quantity: Option<i64>,
}

impl AddToCartForm {
    /// Rebuild the product from the form fields.
    fn product(&self) -> Result<Product> {
        if self.product_id.trim().is_empty() {
            return Err(AppError::BadRequest("missing product id".to_string()));
        }

        let price = Decimal::from_str(self.price.trim())
            .map_err(|_| AppError::BadRequest(format!("invalid price '{}'", self.price)))?;

        Ok(Product {
            id: ProductId::new(self.product_id.trim()),
            name: self.name.clone(),
            price: price.max(Decimal::ZERO),
            image_url: self.image_url.clone(),
            rating: self.rating.map_or(FALLBACK_RATING, clamp_rating),
            review_count: self.review_count,
        })
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub view: CartFragment,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    #[serde(default)]
    pub view: CartFragment,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u64,
}

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
}

/// Cart page lines fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_lines.html")]
pub struct CartLinesTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Toast fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub toast: Option<ToastView>,
}

/// Add-to-cart response: the toast plus out-of-band swaps of the card's
/// in-cart badge and quantity stepper.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub toast: ToastView,
    pub badge: BadgeView,
    pub quantity: QuantityView,
}

// =============================================================================
// Handlers
// =============================================================================

async fn open_cart(session: Session) -> CartStore<SessionCartStorage> {
    CartStore::open(SessionCartStorage::new(session)).await
}

fn lines_fragment(view: CartFragment, cart: &Cart) -> Response {
    let cart = CartView::from(cart);
    let fragment = match view {
        CartFragment::Drawer => CartDrawerTemplate { cart }.into_response(),
        CartFragment::Page => CartLinesTemplate { cart }.into_response(),
    };

    (AppendHeaders([CART_UPDATED_TRIGGER]), fragment).into_response()
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let store = open_cart(session).await;

    CartShowTemplate {
        cart: CartView::from(store.cart()),
        cart_count: store.item_count(),
    }
}

/// Cart drawer fragment (HTMX).
#[instrument(skip(session))]
pub async fn drawer(session: Session) -> impl IntoResponse {
    let store = open_cart(session).await;

    CartDrawerTemplate {
        cart: CartView::from(store.cart()),
    }
}

/// Open or close the drawer (HTMX).
#[instrument(skip(session))]
pub async fn toggle_drawer(session: Session) -> impl IntoResponse {
    let mut store = open_cart(session).await;
    let open = store.toggle_drawer().await;
    tracing::debug!(open, "Toggled cart drawer");

    CartDrawerTemplate {
        cart: CartView::from(store.cart()),
    }
}

/// Add item to cart (HTMX).
///
/// Returns the notification toast, swaps the card's in-cart badge out of
/// band and fires `cart-updated` so the navbar badge and drawer refresh.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let product = form.product()?;
    let quantity = form.quantity.unwrap_or(1);

    let mut store = open_cart(session).await;
    let notification = store.add_item(&product, quantity).await;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", product.id.as_str()),
            ("quantity", &quantity.to_string()),
        ]),
    );

    let dom_id = dom_id(product.id.as_str());

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartAddedTemplate {
            toast: ToastView::new(&notification),
            quantity: QuantityView::reset(&dom_id),
            badge: BadgeView {
                dom_id,
                in_cart: notification.quantity,
                oob: true,
            },
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut store = open_cart(session).await;
    store
        .update_quantity(&ProductId::new(form.product_id.as_str()), form.quantity)
        .await;

    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[("product_id", form.product_id.as_str())]),
    );

    lines_fragment(form.view, store.cart())
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut store = open_cart(session).await;
    store
        .remove_item(&ProductId::new(form.product_id.as_str()))
        .await;

    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );

    lines_fragment(form.view, store.cart())
}

/// Empty the cart (HTMX). Re-renders the cart page lines.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    let mut store = open_cart(session).await;
    store.clear_cart().await;

    add_breadcrumb("cart", "Cleared cart", None);

    lines_fragment(CartFragment::Page, store.cart())
}

/// Dismiss the add-to-cart toast (HTMX).
///
/// Notifications live only in the add response and are never persisted,
/// so there is no session state to clear; the toast region is emptied.
/// On expiry the client timer in `storefront.js` empties it the same way.
#[instrument]
pub async fn dismiss_notification() -> impl IntoResponse {
    ToastTemplate { toast: None }
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let store = open_cart(session).await;

    CartCountTemplate {
        count: store.item_count(),
    }
}
