//! ERP item list client.
//!
//! Lists items through the ERP's generic `get_list` method:
//!
//! ```text
//! POST {ERP_API_URL}/api/method/frappe.client.get_list
//! Authorization: token {key}:{secret}
//!
//! {"doctype": "Item", "fields": [...], "limit_page_length": 100}
//! ```
//!
//! The response wraps the records in a `message` array.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tienda_core::Product;
use tracing::instrument;
use url::Url;

use super::adapter::{ErpAdapter, ErpItem, ProductAdapter};
use super::{CatalogError, ProductSource};
use crate::config::ErpConfig;

/// Path of the list method, relative to the ERP base URL.
const LIST_METHOD_PATH: &str = "/api/method/frappe.client.get_list";

/// Item fields requested from the ERP.
const ITEM_FIELDS: &[&str] = &[
    "name",
    "item_name",
    "item_group",
    "stock_uom",
    "standard_rate",
    "image",
];

/// Body of a `get_list` request.
#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    doctype: &'a str,
    fields: &'a [&'a str],
    limit_page_length: u32,
}

/// Envelope of a `get_list` response.
#[derive(Debug, Deserialize)]
struct ListResponse {
    message: Option<Vec<ErpItem>>,
}

/// A fully configured ERP endpoint.
#[derive(Debug, Clone)]
struct Endpoint {
    list_url: String,
    authorization: SecretString,
    adapter: ErpAdapter,
}

/// Client for the ERP item list.
///
/// Built even when credentials are missing; every fetch then fails with
/// [`CatalogError::NotConfigured`] without touching the network.
#[derive(Debug, Clone)]
pub struct ErpClient {
    client: reqwest::Client,
    endpoint: Option<Endpoint>,
    page_length: u32,
}

impl ErpClient {
    /// Create a client from the ERP configuration.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ErpConfig) -> Self {
        let endpoint = config.credentials().and_then(|creds| {
            let base = match Url::parse(&creds.api_url) {
                Ok(base) => base,
                Err(e) => {
                    tracing::warn!(api_url = %creds.api_url, "Invalid ERP_API_URL: {e}");
                    return None;
                }
            };

            Some(Endpoint {
                list_url: format!("{}{LIST_METHOD_PATH}", creds.api_url),
                authorization: SecretString::from(format!(
                    "token {}:{}",
                    creds.api_key,
                    creds.api_secret.expose_secret()
                )),
                adapter: ErpAdapter::new(base),
            })
        });

        Self {
            client,
            endpoint,
            page_length: config.page_length,
        }
    }

    /// Whether the client has everything it needs to make a request.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl ProductSource for ErpClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::warn!("ERP catalog selected but ERP_API_URL, ERP_API_KEY or ERP_API_SECRET is unset");
            return Err(CatalogError::NotConfigured);
        };

        let body = ListRequest {
            doctype: "Item",
            fields: ITEM_FIELDS,
            limit_page_length: self.page_length,
        };

        let response = self
            .client
            .post(&endpoint.list_url)
            .header(
                reqwest::header::AUTHORIZATION,
                endpoint.authorization.expose_secret(),
            )
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %excerpt(&text), "ERP returned an error");
            return Err(CatalogError::Http {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        let bytes = response.bytes().await?;
        let envelope: ListResponse = serde_json::from_slice(&bytes)?;
        let items = envelope.message.ok_or(CatalogError::MalformedResponse)?;

        tracing::debug!(count = items.len(), "Fetched ERP items");
        Ok(endpoint.adapter.adapt_all(items))
    }
}

/// Pull a human-readable message out of an ERP error body.
///
/// Prefers the ERP's `_error_message`, falls back to the raw JSON, and gives
/// up when the body is not JSON at all.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("_error_message").and_then(|m| m.as_str()) {
        Some(message) => Some(message.to_string()),
        None => Some(value.to_string()),
    }
}

/// First 200 characters of a body, for logs.
fn excerpt(body: &str) -> &str {
    body.char_indices()
        .nth(200)
        .map_or(body, |(idx, _)| &body[..idx])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(url: Option<&str>, key: Option<&str>, secret: Option<&str>) -> ErpConfig {
        ErpConfig {
            api_url: url.map(String::from),
            api_key: key.map(String::from),
            api_secret: secret.map(SecretString::from),
            page_length: 100,
        }
    }

    #[test]
    fn test_error_detail_prefers_error_message() {
        let body = r#"{"exc_type": "PermissionError", "_error_message": "Not permitted"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("Not permitted"));
    }

    #[test]
    fn test_error_detail_falls_back_to_json() {
        let body = r#"{"exc_type":"ValidationError"}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some(r#"{"exc_type":"ValidationError"}"#)
        );
    }

    #[test]
    fn test_error_detail_non_json() {
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail(""), None);
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), 200);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ListRequest {
            doctype: "Item",
            fields: ITEM_FIELDS,
            limit_page_length: 25,
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["doctype"], "Item");
        assert_eq!(value["fields"][0], "name");
        assert_eq!(value["fields"][5], "image");
        assert_eq!(value["limit_page_length"], 25);
    }

    #[test]
    fn test_missing_credentials_not_configured() {
        let client = reqwest::Client::new();

        assert!(!ErpClient::new(client.clone(), &config(None, None, None)).is_configured());
        assert!(
            !ErpClient::new(
                client.clone(),
                &config(Some("https://erp.example.com"), Some("key"), None)
            )
            .is_configured()
        );
        assert!(
            ErpClient::new(
                client,
                &config(Some("https://erp.example.com"), Some("key"), Some("3f9c1a7be2d4680"))
            )
            .is_configured()
        );
    }

    #[tokio::test]
    async fn test_fetch_without_credentials_fails_fast() {
        let client = ErpClient::new(reqwest::Client::new(), &config(None, None, None));
        let err = client.fetch_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::NotConfigured));
    }
}
