//! Product catalog sources.
//!
//! Two backends feed the product grid: a public storefront API returning a
//! plain JSON array, and an ERP item list behind token authentication. Each
//! has its own wire shape and a [`ProductAdapter`] that turns one record into
//! the canonical [`Product`](tienda_core::Product).
//!
//! [`ProductFeed`] drives a single fetch through the
//! `Idle -> Loading -> Loaded | Failed` state machine the grid renders from.

pub mod adapter;
pub mod erp;
pub mod feed;
pub mod public;

pub use adapter::{ErpAdapter, ErpItem, ProductAdapter, PublicCatalogAdapter, PublicProduct};
pub use erp::ErpClient;
pub use feed::{LoadState, ProductFeed};
pub use public::PublicCatalogClient;

use thiserror::Error;
use tienda_core::Product;

use crate::config::{CatalogConfig, CatalogSourceKind};

/// User agent sent with every catalog request.
const USER_AGENT: &str = concat!("tienda-storefront/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when fetching products.
///
/// The `Display` output is shown to shoppers in place of the product grid.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Required ERP settings are missing; no request was attempted.
    #[error("ERP API environment variables are not configured")]
    NotConfigured,

    /// The source answered with a non-2xx status.
    #[error("HTTP error! status: {status}{}", detail_suffix(.detail.as_deref()))]
    Http {
        status: u16,
        /// Best-effort server message.
        detail: Option<String>,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The ERP envelope has no `message` array.
    #[error("ERP response is missing the expected 'message' field")]
    MalformedResponse,

    /// The body is not the JSON shape the adapter expects.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(" - {d}")).unwrap_or_default()
}

/// Anything that can produce the full product list in one call.
pub trait ProductSource {
    /// Fetch and adapt every product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the source is unconfigured, unreachable,
    /// answers with a non-2xx status, or returns an unexpected body.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}

/// The configured catalog backend.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Public(PublicCatalogClient),
    Erp(ErpClient),
}

impl CatalogSource {
    /// Build the source selected by `CATALOG_SOURCE`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(match config.source {
            CatalogSourceKind::Public => {
                Self::Public(PublicCatalogClient::new(client, &config.public_api_url))
            }
            CatalogSourceKind::Erp => Self::Erp(ErpClient::new(client, &config.erp)),
        })
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Public(_) => "public",
            Self::Erp(_) => "erp",
        }
    }
}

impl ProductSource for CatalogSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        match self {
            Self::Public(client) => client.fetch_products().await,
            Self::Erp(client) => client.fetch_products().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_messages() {
        let err = CatalogError::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");

        let err = CatalogError::Http {
            status: 403,
            detail: Some("Not permitted".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 403 - Not permitted");
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            CatalogError::NotConfigured.to_string(),
            "ERP API environment variables are not configured"
        );
        assert_eq!(
            CatalogError::MalformedResponse.to_string(),
            "ERP response is missing the expected 'message' field"
        );
    }

    #[test]
    fn test_decode_message_prefix() {
        let err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(
            CatalogError::from(err)
                .to_string()
                .starts_with("Invalid response body: ")
        );
    }

    #[test]
    fn test_source_selection() {
        let mut config = CatalogConfig::default();
        let source = CatalogSource::from_config(&config).unwrap();
        assert_eq!(source.name(), "public");

        config.source = CatalogSourceKind::Erp;
        let source = CatalogSource::from_config(&config).unwrap();
        assert_eq!(source.name(), "erp");
    }
}
