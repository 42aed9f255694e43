//! Shared setup for the database-backed storefront tests.
//!
//! Each `#[sqlx::test]` gets a fresh database with the workspace migrations
//! applied. Bearer tokens are resolved by a local stand-in for the hosted
//! auth service that always answers with the test customer.

#![allow(dead_code, clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use axum::{Json, Router, routing::get};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use bhavani_core::{ProductId, Size, UserId};
use bhavani_storefront::config::{StorefrontConfig, SupabaseConfig};
use bhavani_storefront::routes;
use bhavani_storefront::state::AppState;

/// A customer nobody else in the test database shares.
pub fn new_customer() -> UserId {
    UserId::new(Uuid::new_v4())
}

/// Insert a product priced at 1299 with the given stock rows.
pub async fn seed_product(
    pool: &PgPool,
    name: &str,
    published: bool,
    stock: &[(Size, i32)],
) -> ProductId {
    let (id,): (ProductId,) = sqlx::query_as(
        r"
        INSERT INTO products (name, slug, price, category, images, is_draft)
        VALUES ($1, $2, $3, 'Kurtas', ARRAY['https://cdn.example.com/kurta.jpg'], $4)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(name.to_lowercase().replace(' ', "-"))
    .bind(Decimal::from(1299))
    .bind(!published)
    .fetch_one(pool)
    .await
    .unwrap();

    for (size, quantity) in stock {
        sqlx::query("INSERT INTO product_stock (product_id, size, quantity) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(size.as_str())
            .bind(*quantity)
            .execute(pool)
            .await
            .unwrap();
    }
    id
}

/// Serve `/auth/v1/user` for `customer` on a random local port.
async fn auth_stub(customer: UserId) -> String {
    let user = json!({ "id": customer, "email": "meera@example.com" });
    let app = Router::new().route(
        "/auth/v1/user",
        get(move || {
            let user = user.clone();
            async move { Json(user) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

/// The API router (without rate limiting) over `pool`, signed in as `customer`.
pub async fn build_test_app(pool: PgPool, customer: UserId) -> Router {
    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        allowed_origins: Vec::new(),
        supabase: SupabaseConfig {
            url: auth_stub(customer).await,
            anon_key: SecretString::from("test-anon-key"),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    routes::api_routes().with_state(AppState::new(config, pool).unwrap())
}

/// Send an authenticated request, with a JSON body when given.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer test-access-token");
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Read a JSON response body.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
