//! Product loading state for the catalog grid.

use tienda_core::Product;

use super::ProductSource;

/// Where a product load stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The fetch succeeded.
    Loaded(Vec<Product>),
    /// The fetch failed; the message is shown as-is.
    Failed(String),
}

/// Products for one page mount: a single fetch and its outcome.
///
/// No retry and no caching. A new feed means a new fetch.
#[derive(Debug, Clone, Default)]
pub struct ProductFeed {
    state: LoadState,
}

impl ProductFeed {
    /// Create an idle feed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LoadState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Loaded products; empty while idle, loading, or after a failure.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match &self.state {
            LoadState::Loaded(products) => products,
            _ => &[],
        }
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Failure message, if the fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Run one fetch against `source` and settle the state.
    pub async fn load(&mut self, source: &impl ProductSource) -> &LoadState {
        self.state = LoadState::Loading;

        self.state = match source.fetch_products().await {
            Ok(products) => {
                tracing::info!(count = products.len(), "Products loaded");
                LoadState::Loaded(products)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load products");
                LoadState::Failed(e.to_string())
            }
        };

        &self.state
    }
}
