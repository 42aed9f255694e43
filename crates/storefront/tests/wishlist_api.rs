//! Database-backed tests for the wishlist: duplicates, toggling and moving
//! entries into the cart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, new_customer, seed_product, send};
use serde_json::json;
use sqlx::PgPool;

use bhavani_core::Size;

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_add_is_conflict(pool: PgPool) {
    let product = seed_product(&pool, "Kalamkari Stole", true, &[(Size::Free, 5)]).await;
    let app = build_test_app(pool, new_customer()).await;

    let body = json!({ "product_id": product });
    let response = send(&app, "POST", "/api/wishlist", Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, "POST", "/api/wishlist", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "product is already in your wishlist"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_or_draft_product_is_not_found(pool: PgPool) {
    let draft = seed_product(&pool, "Draft Kurta", false, &[(Size::M, 1)]).await;
    let app = build_test_app(pool, new_customer()).await;

    let response = send(&app, "POST", "/api/wishlist", Some(json!({ "product_id": draft }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "POST", "/api/wishlist", Some(json!({ "product_id": 999_999 }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_toggle_adds_then_removes(pool: PgPool) {
    let product = seed_product(&pool, "Ikat Kurta", true, &[(Size::M, 5)]).await;
    let app = build_test_app(pool, new_customer()).await;
    let uri = format!("/api/wishlist/{product}/toggle");

    let first = body_json(send(&app, "POST", &uri, None).await).await;
    assert_eq!(first["wishlisted"], true);
    let listed = body_json(send(&app, "GET", "/api/wishlist", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let second = body_json(send(&app, "POST", &uri, None).await).await;
    assert_eq!(second["wishlisted"], false);
    let listed = body_json(send(&app, "GET", "/api/wishlist", None).await).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_move_to_cart_transfers_entry(pool: PgPool) {
    let product = seed_product(&pool, "Phulkari Dupatta", true, &[(Size::Free, 4)]).await;
    let app = build_test_app(pool, new_customer()).await;
    send(&app, "POST", "/api/wishlist", Some(json!({ "product_id": product }))).await;

    let response = send(
        &app,
        "POST",
        &format!("/api/wishlist/{product}/move-to-cart"),
        Some(json!({ "size": "Free Size", "quantity": 2 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cart = body_json(response).await;
    assert_eq!(cart["items"][0]["quantity"], 2);

    let listed = body_json(send(&app, "GET", "/api/wishlist", None).await).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_failed_move_keeps_wishlist_entry(pool: PgPool) {
    let product = seed_product(&pool, "Zari Lehenga", true, &[(Size::S, 1)]).await;
    let app = build_test_app(pool, new_customer()).await;
    send(&app, "POST", "/api/wishlist", Some(json!({ "product_id": product }))).await;

    let response = send(
        &app,
        "POST",
        &format!("/api/wishlist/{product}/move-to-cart"),
        Some(json!({ "size": "S", "quantity": 2 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let listed = body_json(send(&app, "GET", "/api/wishlist", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let cart = body_json(send(&app, "GET", "/api/cart", None).await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_move_without_entry_is_not_found(pool: PgPool) {
    let product = seed_product(&pool, "Gota Patti Suit", true, &[(Size::M, 3)]).await;
    let app = build_test_app(pool, new_customer()).await;

    let response = send(
        &app,
        "POST",
        &format!("/api/wishlist/{product}/move-to-cart"),
        Some(json!({ "size": "M" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
