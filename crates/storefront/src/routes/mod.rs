//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (public)
//! GET    /api/products                       - List published products
//! GET    /api/products/{id}                  - Product detail with stock by size
//! GET    /api/products/slug/{slug}           - Product detail by slug
//! GET    /api/categories                     - Categories with product counts
//!
//! # Cart (bearer token)
//! GET    /api/cart                           - Cart with totals
//! POST   /api/cart                           - Add to cart (merges by size)
//! DELETE /api/cart                           - Clear cart
//! PATCH  /api/cart/{id}                      - Set line quantity (0 removes)
//! DELETE /api/cart/{id}                      - Remove line
//!
//! # Wishlist (bearer token)
//! GET    /api/wishlist                       - List
//! POST   /api/wishlist                       - Add
//! DELETE /api/wishlist/{product_id}          - Remove
//! POST   /api/wishlist/{product_id}/toggle   - Toggle
//! POST   /api/wishlist/{product_id}/move-to-cart - Move to cart
//!
//! # Profile (bearer token)
//! GET    /api/profile                        - Get (created on first access)
//! PUT    /api/profile                        - Update
//!
//! # Contact (public, strictly rate limited)
//! POST   /api/contact                        - Submit contact form
//! ```

pub mod cart;
pub mod contact;
pub mod products;
pub mod profile;
pub mod wishlist;

use axum::Router;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::{api_rate_limiter, contact_rate_limiter};
use crate::state::AppState;

/// Build the API router with rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(api_routes().layer(api_rate_limiter()))
        .merge(contact::router().layer(contact_rate_limiter()))
}

/// Every route except the contact form, without rate limiting.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(cart::router())
        .merge(wishlist::router())
        .merge(profile::router())
}

/// Map `RepositoryError::NotFound` to a 404 naming the missing thing.
fn not_found(what: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => AppError::Database(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use crate::config::{StorefrontConfig, SupabaseConfig};
    use crate::state::AppState;

    /// State over a pool that never connects. Only usable for requests that
    /// are rejected before reaching the database or the auth service.
    pub fn offline_state() -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/bhavani_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            allowed_origins: Vec::new(),
            supabase: SupabaseConfig {
                url: "http://127.0.0.1:9".to_string(),
                anon_key: SecretString::from("test-anon-key"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bhavani_test")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    /// Read a JSON response body.
    pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use super::test_support::{json_body, offline_state};

    fn contact_request(client_ip: &str) -> Request<Body> {
        // Fails validation, so the handler never reaches the database.
        Request::builder()
            .method("POST")
            .uri("/api/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", client_ip)
            .body(Body::from(r#"{"email": "meera@example.com", "message": "Hi"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_contact_form_limit_returns_json_429() {
        let app = routes().with_state(offline_state());

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(contact_request("203.0.113.9"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app
            .clone()
            .oneshot(contact_request("203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let json = json_body(response).await;
        assert_eq!(json["error"], "Too many requests, please try again later");

        // Other clients keep their own budget.
        let response = app
            .oneshot(contact_request("198.51.100.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_request_without_client_address_is_json_400() {
        let app = routes().with_state(offline_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Unable to determine client address"
        );
    }
}
