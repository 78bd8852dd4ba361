//! Public catalog API client.
//!
//! `GET <CATALOG_API_URL>` returns a bare JSON array of products.

use tienda_core::Product;
use tracing::instrument;

use super::adapter::{ProductAdapter, PublicCatalogAdapter, PublicProduct};
use super::{CatalogError, ProductSource};

/// Client for the public catalog endpoint.
#[derive(Debug, Clone)]
pub struct PublicCatalogClient {
    client: reqwest::Client,
    url: String,
}

impl PublicCatalogClient {
    /// Create a client for the given endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

impl ProductSource for PublicCatalogClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Public catalog returned an error");
            return Err(CatalogError::Http {
                status: status.as_u16(),
                detail: None,
            });
        }

        let body = response.bytes().await?;
        let records: Vec<PublicProduct> = serde_json::from_slice(&body)?;

        tracing::debug!(count = records.len(), "Fetched public catalog");
        Ok(PublicCatalogAdapter.adapt_all(records))
    }
}
