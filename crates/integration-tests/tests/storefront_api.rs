//! Storefront API tests against a running server.
//!
//! Run with: cargo test -p bhavani-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use bhavani_integration_tests::{
    Service, client, customer_token, error_message, with_token,
};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = client()
        .get(Service::Storefront.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let ready = client()
        .get(Service::Storefront.url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_request_id_is_echoed() {
    let resp = client()
        .get(Service::Storefront.url("/health"))
        .header("x-request-id", "it-storefront-1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "it-storefront-1");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_catalog_lists_published_products() {
    let resp = client()
        .get(Service::Storefront.url("/api/products?limit=5&sort=price_asc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["limit"], 5);
    let items = page["items"].as_array().unwrap();
    assert!(items.len() <= 5);

    let prices: Vec<f64> = items
        .iter()
        .map(|p| p["price"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_catalog_rejects_bad_sort() {
    let resp = client()
        .get(Service::Storefront.url("/api/products?sort=random"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(error_message(&body).is_some());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_missing_product_is_404() {
    let resp = client()
        .get(Service::Storefront.url("/api/products/slug/no-such-product-anywhere"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_requires_token() {
    let resp = client()
        .get(Service::Storefront.url("/api/cart"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(error_message(&body), Some("Missing bearer token"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_contact_validation() {
    let resp = client()
        .post(Service::Storefront.url("/api/contact"))
        .json(&json!({ "name": "Asha", "email": "not-an-email", "message": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_contact_submission() {
    let resp = client()
        .post(Service::Storefront.url("/api/contact"))
        .json(&json!({
            "name": "Asha Rao",
            "email": "asha@example.com",
            "subject": "Blouse stitching",
            "message": "Do you offer custom blouse stitching for sarees?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert!(body["id"].is_i64());
}

#[tokio::test]
#[ignore = "Requires running storefront server and TEST_CUSTOMER_TOKEN"]
async fn test_profile_round_trip() {
    let Some(token) = customer_token() else {
        return;
    };
    let client = client();

    let resp = with_token(client.get(Service::Storefront.url("/api/profile")), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = with_token(client.put(Service::Storefront.url("/api/profile")), &token)
        .json(&json!({ "city": "Chennai", "postal_code": "600001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["city"], "Chennai");

    let resp = with_token(client.put(Service::Storefront.url("/api/profile")), &token)
        .json(&json!({ "postal_code": "012345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and TEST_CUSTOMER_TOKEN"]
async fn test_cart_rejects_unknown_product() {
    let Some(token) = customer_token() else {
        return;
    };

    let resp = with_token(client().post(Service::Storefront.url("/api/cart")), &token)
        .json(&json!({ "product_id": 2_000_000_000, "size": "M", "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
