//! Catalog client integration tests.
//!
//! Each test serves a canned catalog from a local axum server and fetches
//! it through the real HTTP clients.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tienda_core::ProductId;
use tienda_integration_tests::spawn_server;
use tienda_storefront::catalog::{
    CatalogError, CatalogSource, ErpClient, LoadState, ProductFeed, ProductSource,
    PublicCatalogClient,
};
use tienda_storefront::config::{CatalogConfig, CatalogSourceKind, ErpConfig};

const ERP_LIST_PATH: &str = "/api/method/frappe.client.get_list";

fn erp_config(base: &str) -> ErpConfig {
    ErpConfig {
        api_url: Some(format!("{base}/")),
        api_key: Some("key".to_string()),
        api_secret: Some(SecretString::from("secret")),
        page_length: 25,
    }
}

/// Serve a fixed status and body at `path` for both GET and POST.
async fn canned(path: &str, status: StatusCode, body: Value) -> String {
    let get_body = body.clone();
    let router = Router::new().route(
        path,
        get(move || async move { (status, Json(get_body)) })
            .post(move || async move { (status, Json(body)) }),
    );
    spawn_server(router).await
}

// =============================================================================
// Public catalog
// =============================================================================

#[tokio::test]
async fn test_public_catalog_adapts_products() {
    let base = canned(
        "/products",
        StatusCode::OK,
        json!([
            {
                "id": 1,
                "title": "Backpack",
                "price": 109.95,
                "image": "https://img.example/1.jpg",
                "rating": {"rate": 3.9, "count": 120}
            },
            {"id": "two", "title": "Mug", "price": 12.5}
        ]),
    )
    .await;

    let client = PublicCatalogClient::new(reqwest::Client::new(), &format!("{base}/products"));
    let products = client.fetch_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new("1"));
    assert_eq!(products[0].name, "Backpack");
    assert_eq!(products[0].review_count, Some(120));
    assert!((products[0].rating - 3.9).abs() < f64::EPSILON);
    assert_eq!(products[1].id, ProductId::new("two"));
    assert_eq!(products[1].price, Decimal::new(125, 1));
    assert!(products[1].image_url.is_empty());
}

#[tokio::test]
async fn test_public_catalog_error_status_fails_feed() {
    let base = canned(
        "/products",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "boom"}),
    )
    .await;

    let client = PublicCatalogClient::new(reqwest::Client::new(), &format!("{base}/products"));
    let err = client.fetch_products().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 500");

    let mut feed = ProductFeed::new();
    feed.load(&client).await;
    assert_eq!(feed.error(), Some("HTTP error! status: 500"));
    assert!(feed.products().is_empty());
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn test_public_catalog_rejects_non_array_body() {
    let base = canned("/products", StatusCode::OK, json!({"products": []})).await;

    let client = PublicCatalogClient::new(reqwest::Client::new(), &format!("{base}/products"));
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_catalog_is_a_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PublicCatalogClient::new(reqwest::Client::new(), &format!("http://{addr}/"));
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport(_)));
    assert!(err.to_string().starts_with("Network error: "));
}

// =============================================================================
// ERP
// =============================================================================

#[tokio::test]
async fn test_erp_sends_token_and_adapts_items() {
    let seen: Arc<Mutex<Option<(String, Value)>>> = Arc::default();
    let captured = Arc::clone(&seen);

    let router = Router::new().route(
        ERP_LIST_PATH,
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = Arc::clone(&captured);
            async move {
                let auth = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *captured.lock().unwrap() = Some((auth, body));

                Json(json!({
                    "message": [
                        {
                            "name": "ITEM-001",
                            "item_name": "Desk Lamp",
                            "item_group": "Lighting",
                            "stock_uom": "Nos",
                            "standard_rate": 42.5,
                            "image": "/files/lamp.png"
                        },
                        {"name": "ITEM-002", "standard_rate": -3.0}
                    ]
                }))
            }
        }),
    );
    let base = spawn_server(router).await;

    let client = ErpClient::new(reqwest::Client::new(), &erp_config(&base));
    assert!(client.is_configured());
    let products = client.fetch_products().await.unwrap();

    let (auth, body) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(auth, "token key:secret");
    assert_eq!(body["doctype"], "Item");
    assert_eq!(body["limit_page_length"], 25);
    assert!(
        body["fields"]
            .as_array()
            .unwrap()
            .contains(&json!("standard_rate"))
    );

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new("ITEM-001"));
    assert_eq!(products[0].name, "Desk Lamp");
    assert_eq!(products[0].price, Decimal::new(425, 1));
    assert_eq!(products[0].image_url, format!("{base}/files/lamp.png"));
    assert_eq!(products[0].review_count, None);
    assert_eq!(products[1].name, "ITEM-002");
    assert_eq!(products[1].price, Decimal::ZERO);
}

#[tokio::test]
async fn test_erp_under_sub_path_keeps_path_for_images() {
    let base = canned(
        &format!("/erp{ERP_LIST_PATH}"),
        StatusCode::OK,
        json!({"message": [{"name": "ITEM-9", "image": "/files/chair.jpg"}]}),
    )
    .await;

    let client = ErpClient::new(reqwest::Client::new(), &erp_config(&format!("{base}/erp")));
    let products = client.fetch_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].image_url, format!("{base}/erp/files/chair.jpg"));
}

#[tokio::test]
async fn test_erp_missing_message_is_malformed() {
    let base = canned(ERP_LIST_PATH, StatusCode::OK, json!({"data": []})).await;

    let client = ErpClient::new(reqwest::Client::new(), &erp_config(&base));
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::MalformedResponse));
}

#[tokio::test]
async fn test_erp_error_body_is_surfaced() {
    let base = canned(
        ERP_LIST_PATH,
        StatusCode::FORBIDDEN,
        json!({"exc_type": "PermissionError", "_error_message": "Not permitted"}),
    )
    .await;

    let client = ErpClient::new(reqwest::Client::new(), &erp_config(&base));
    let err = client.fetch_products().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 403 - Not permitted");
}

#[tokio::test]
async fn test_unconfigured_erp_fails_without_request() {
    let config = CatalogConfig {
        source: CatalogSourceKind::Erp,
        ..CatalogConfig::default()
    };
    let source = CatalogSource::from_config(&config).unwrap();
    assert_eq!(source.name(), "erp");

    let mut feed = ProductFeed::new();
    let state = feed.load(&source).await;
    assert_eq!(
        state,
        &LoadState::Failed("ERP API environment variables are not configured".to_string())
    );
}
