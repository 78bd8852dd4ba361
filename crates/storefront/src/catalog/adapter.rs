//! Wire records and their adapters into [`Product`].
//!
//! Adapters never reject a record. Every wire field is optional and missing
//! values fall back to empty strings, zero prices and the fallback rating.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tienda_core::{FALLBACK_RATING, Product, ProductId, clamp_rating};
use url::Url;

/// Converts one external record into the canonical product.
pub trait ProductAdapter {
    /// The wire shape of one record.
    type Record: DeserializeOwned;

    /// Map a record to a product. Total: never fails.
    fn adapt(&self, record: Self::Record) -> Product;

    /// Map every record, preserving order.
    fn adapt_all(&self, records: Vec<Self::Record>) -> Vec<Product> {
        records.into_iter().map(|r| self.adapt(r)).collect()
    }
}

// =============================================================================
// Public catalog
// =============================================================================

/// A product as returned by the public catalog API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicProduct {
    pub id: Option<RecordId>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub rating: Option<PublicRating>,
}

/// Rating summary attached to a public catalog product.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PublicRating {
    pub rate: Option<f64>,
    pub count: Option<u32>,
}

/// Identifier that may arrive as a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RecordId> for ProductId {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Number(n) => Self::new(n.to_string()),
            RecordId::Text(s) => Self::new(s),
        }
    }
}

/// Adapter for [`PublicProduct`] records.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicCatalogAdapter;

impl ProductAdapter for PublicCatalogAdapter {
    type Record = PublicProduct;

    fn adapt(&self, record: PublicProduct) -> Product {
        let rating = record.rating.unwrap_or_default();

        Product {
            id: record.id.map(ProductId::from).unwrap_or_default(),
            name: record.title.unwrap_or_default(),
            price: to_price(record.price),
            image_url: record.image.unwrap_or_default(),
            rating: rating.rate.map_or(FALLBACK_RATING, clamp_rating),
            review_count: rating.count,
        }
    }
}

// =============================================================================
// ERP
// =============================================================================

/// An item as returned by the ERP list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErpItem {
    /// Item code, unique per ERP.
    pub name: Option<String>,
    pub item_name: Option<String>,
    pub item_group: Option<String>,
    pub stock_uom: Option<String>,
    pub standard_rate: Option<f64>,
    /// Usually a site-relative path such as `/files/chair.jpg`.
    pub image: Option<String>,
}

/// Adapter for [`ErpItem`] records.
///
/// Relative image paths are prefixed with the ERP base URL, keeping any
/// path the ERP is mounted under.
#[derive(Debug, Clone)]
pub struct ErpAdapter {
    image_base: Url,
}

impl ErpAdapter {
    #[must_use]
    pub const fn new(image_base: Url) -> Self {
        Self { image_base }
    }

    fn resolve_image(&self, image: &str) -> String {
        if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
            return image.to_string();
        }

        let base = self.image_base.as_str().trim_end_matches('/');
        let sep = if image.starts_with('/') { "" } else { "/" };
        format!("{base}{sep}{image}")
    }
}

impl ProductAdapter for ErpAdapter {
    type Record = ErpItem;

    fn adapt(&self, record: ErpItem) -> Product {
        let code = record.name.unwrap_or_default();
        let name = record
            .item_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| code.clone());
        let image_url = record
            .image
            .as_deref()
            .map(|i| self.resolve_image(i))
            .unwrap_or_default();

        Product {
            id: ProductId::new(code),
            name,
            price: to_price(record.standard_rate),
            image_url,
            rating: FALLBACK_RATING,
            review_count: None,
        }
    }
}

/// Convert a wire price to a non-negative decimal.
fn to_price(price: Option<f64>) -> Decimal {
    price
        .and_then(Decimal::from_f64)
        .map_or(Decimal::ZERO, |p| p.max(Decimal::ZERO))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn public(json: &str) -> Product {
        let record: PublicProduct = serde_json::from_str(json).unwrap();
        PublicCatalogAdapter.adapt(record)
    }

    fn erp_adapter() -> ErpAdapter {
        ErpAdapter::new(Url::parse("https://erp.example.com").unwrap())
    }

    fn erp(json: &str) -> Product {
        let record: ErpItem = serde_json::from_str(json).unwrap();
        erp_adapter().adapt(record)
    }

    #[test]
    fn test_public_full_record() {
        let product = public(
            r#"{
                "id": 1,
                "title": "Fjallraven Backpack",
                "price": 109.95,
                "description": "ignored",
                "image": "https://fakestoreapi.com/img/81fPKd-2AYL.jpg",
                "rating": {"rate": 3.9, "count": 120}
            }"#,
        );

        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.name, "Fjallraven Backpack");
        assert_eq!(product.price, Decimal::new(10995, 2));
        assert_eq!(
            product.image_url,
            "https://fakestoreapi.com/img/81fPKd-2AYL.jpg"
        );
        assert!((product.rating - 3.9).abs() < f64::EPSILON);
        assert_eq!(product.review_count, Some(120));
    }

    #[test]
    fn test_public_string_id() {
        assert_eq!(public(r#"{"id": "sku-9"}"#).id.as_str(), "sku-9");
    }

    #[test]
    fn test_public_missing_fields() {
        let product = public("{}");

        assert_eq!(product.id.as_str(), "");
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert!(!product.has_image());
        assert!((product.rating - FALLBACK_RATING).abs() < f64::EPSILON);
        assert_eq!(product.review_count, None);
    }

    #[test]
    fn test_public_nulls_and_out_of_range() {
        let product = public(r#"{"id": 2, "price": -5, "image": null, "rating": {"rate": 9}}"#);

        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.image_url, "");
        assert!((product.rating - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_erp_relative_image_resolved() {
        let product = erp(
            r#"{
                "name": "CHAIR-001",
                "item_name": "Oak Chair",
                "item_group": "Furniture",
                "stock_uom": "Nos",
                "standard_rate": 149.5,
                "image": "/files/oak-chair.jpg"
            }"#,
        );

        assert_eq!(product.id.as_str(), "CHAIR-001");
        assert_eq!(product.name, "Oak Chair");
        assert_eq!(product.price, Decimal::new(1495, 1));
        assert_eq!(
            product.image_url,
            "https://erp.example.com/files/oak-chair.jpg"
        );
        assert!((product.rating - FALLBACK_RATING).abs() < f64::EPSILON);
        assert_eq!(product.review_count, None);
    }

    #[test]
    fn test_erp_image_keeps_base_path() {
        let adapter = ErpAdapter::new(Url::parse("https://host.example/erp").unwrap());

        let record: ErpItem = serde_json::from_str(r#"{"image": "/files/x.jpg"}"#).unwrap();
        assert_eq!(
            adapter.adapt(record).image_url,
            "https://host.example/erp/files/x.jpg"
        );

        let record: ErpItem = serde_json::from_str(r#"{"image": "files/x.jpg"}"#).unwrap();
        assert_eq!(
            adapter.adapt(record).image_url,
            "https://host.example/erp/files/x.jpg"
        );
    }

    #[test]
    fn test_erp_absolute_image_passthrough() {
        let product = erp(r#"{"name": "X", "image": "https://cdn.example.com/x.png"}"#);
        assert_eq!(product.image_url, "https://cdn.example.com/x.png");
    }

    #[test]
    fn test_erp_defaults() {
        let product = erp(r#"{"name": "BOLT-10", "item_name": ""}"#);

        assert_eq!(product.name, "BOLT-10");
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.image_url, "");
    }

    #[test]
    fn test_adapt_all_preserves_order() {
        let records: Vec<PublicProduct> =
            serde_json::from_str(r#"[{"id": 3}, {"id": 1}, {"id": 2}]"#).unwrap();
        let ids: Vec<String> = PublicCatalogAdapter
            .adapt_all(records)
            .into_iter()
            .map(|p| p.id.into())
            .collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }
}
