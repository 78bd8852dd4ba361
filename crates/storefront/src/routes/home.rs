//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, SessionCartStorage};
use crate::routes::products::SKELETON_CARD_COUNT;

/// Catalog page template.
///
/// Renders skeleton cards; the grid replaces them once it has loaded.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub skeleton_count: usize,
    pub cart_count: u64,
}

/// Display the catalog page.
#[instrument(skip(session))]
pub async fn home(session: Session) -> impl IntoResponse {
    let store = CartStore::open(SessionCartStorage::new(session)).await;

    HomeTemplate {
        skeleton_count: SKELETON_CARD_COUNT,
        cart_count: store.item_count(),
    }
}
