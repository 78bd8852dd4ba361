//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog page (skeleton grid, loads grid via HTMX)
//! GET  /health                    - Health check
//!
//! # Products (HTMX fragments)
//! GET  /products/grid             - Product grid (one catalog fetch)
//! POST /products/quantity         - Card quantity stepper
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! GET  /cart/drawer               - Drawer
//! POST /cart/drawer/toggle        - Open/close drawer (returns drawer)
//! POST /cart/add                  - Add to cart (returns toast, triggers cart-updated)
//! POST /cart/update               - Set quantity (returns drawer or page lines)
//! POST /cart/remove               - Remove line (returns drawer or page lines)
//! POST /cart/clear                - Empty cart (returns page lines)
//! POST /cart/notification/dismiss - Dismiss toast
//! GET  /cart/count                - Cart count badge
//!
//! GET  /static/*                  - Stylesheet and script
//! ```

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/grid", get(products::grid))
        .route("/quantity", post(products::quantity))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/drawer", get(cart::drawer))
        .route("/drawer/toggle", post(cart::toggle_drawer))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/notification/dismiss", post(cart::dismiss_notification))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .fallback(not_found)
}

/// Build the full application: routes, static files and middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(request: Request) -> AppError {
    AppError::NotFound(request.uri().path().to_string())
}
