//! Integration tests for Tienda.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```
//!
//! No external services are needed: catalog backends are stood up as local
//! axum servers on an ephemeral port, and the storefront router is driven
//! in-process with `tower::ServiceExt::oneshot`.
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store persistence, hydration and subscriptions
//! - `catalog_sources` - Public and ERP catalog clients over HTTP
//! - `storefront_routes` - Full router with middleware and sessions

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use rust_decimal::Decimal;
use tienda_core::{Product, ProductId};
use tienda_storefront::config::{CatalogConfig, StorefrontConfig};

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{addr}")
}

/// Storefront configuration pointing at the given catalog settings.
#[must_use]
pub fn test_config(catalog: CatalogConfig) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        catalog,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A product with the given id and price in cents.
#[must_use]
pub fn product(id: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        image_url: format!("https://img.example/{id}.jpg"),
        rating: 4.0,
        review_count: None,
    }
}
