//! Integration tests for Bhavani Boutique.
//!
//! The tests in `tests/` drive the storefront and admin binaries over HTTP
//! and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! bb-cli migrate
//! cargo run -p bhavani-storefront &
//! cargo run -p bhavani-admin &
//! cargo test -p bhavani-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `TEST_CUSTOMER_TOKEN` - access token of a customer account
//! - `TEST_ADMIN_TOKEN` - access token of an account promoted with
//!   `bb-cli admin promote`
//!
//! Tests that need a token skip themselves when it is not set.

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// Which service a request goes to.
#[derive(Debug, Clone, Copy)]
pub enum Service {
    Storefront,
    Admin,
}

impl Service {
    /// Base URL, overridable through the environment.
    #[must_use]
    pub fn base_url(self) -> String {
        let (key, default) = match self {
            Self::Storefront => ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            Self::Admin => ("ADMIN_BASE_URL", "http://localhost:3001"),
        };
        std::env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Absolute URL of `path` on this service.
    #[must_use]
    pub fn url(self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

/// HTTP client shared by a test.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Customer access token, if configured.
#[must_use]
pub fn customer_token() -> Option<String> {
    std::env::var("TEST_CUSTOMER_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Admin access token, if configured.
#[must_use]
pub fn admin_token() -> Option<String> {
    std::env::var("TEST_ADMIN_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Attach a bearer token.
#[must_use]
pub fn with_token(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header("authorization", format!("Bearer {token}"))
}

/// The `error` message of an error body.
#[must_use]
pub fn error_message(body: &Value) -> Option<&str> {
    body.get("error").and_then(Value::as_str)
}

/// A product name unique to this test run, so slugs never collide.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("{prefix} {nanos}")
}
