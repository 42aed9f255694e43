//! Access-token verification against the hosted auth API.

use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{AuthUser, SupabaseError};
use crate::config::SupabaseConfig;

/// How long a verified token is trusted without asking the auth service again.
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(60);

/// Upper bound on cached tokens.
const TOKEN_CACHE_CAPACITY: u64 = 10_000;

/// Request timeout for auth lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies bearer tokens by calling `GET /auth/v1/user`.
///
/// Successful lookups are cached briefly so a page that fires several API
/// calls costs one round-trip to the auth service.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    client: reqwest::Client,
    user_url: String,
    cache: Cache<String, AuthUser>,
}

impl SupabaseAuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| SupabaseError::Parse(format!("Invalid anon key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(TOKEN_CACHE_CAPACITY)
            .time_to_live(TOKEN_CACHE_TTL)
            .build();

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", config.url),
            cache,
        })
    }

    /// Resolve the user that owns an access token.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` for any 4xx answer, and
    /// `SupabaseError::Http`/`Api`/`Parse` if the service could not be asked
    /// or failed on its side.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        if let Some(user) = self.cache.get(access_token).await {
            return Ok(user);
        }

        let response = self
            .client
            .get(&self.user_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();

        // Any 4xx (expired, malformed, or a deleted user) means the token is bad.
        if status.is_client_error() {
            return Err(SupabaseError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;

        tracing::debug!(user_id = %user.id, "Access token verified");
        self.cache
            .insert(access_token.to_owned(), user.clone())
            .await;

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use secrecy::SecretString;

    use super::*;

    const USER_JSON: &str = r#"{"id": "0b6c1f3e-8a55-4c52-9a0c-3c2f8b1d9e77", "email": "asha@example.com"}"#;

    /// Serve `/auth/v1/user` with a fixed status and body on a random port.
    async fn auth_stub(status: StatusCode, body: &'static str) -> SupabaseAuthClient {
        let app = Router::new().route("/auth/v1/user", get(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        SupabaseAuthClient::new(&SupabaseConfig {
            url: format!("http://{addr}"),
            anon_key: SecretString::from("anon-key"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_client_errors_reject_the_token() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::UNPROCESSABLE_ENTITY,
        ] {
            let client = auth_stub(status, r#"{"code": "bad_jwt"}"#).await;
            let result = client.get_user("some-token").await;
            assert!(
                matches!(result, Err(SupabaseError::Unauthorized)),
                "{status} should reject the token, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_server_error_is_an_api_error() {
        let client = auth_stub(StatusCode::SERVICE_UNAVAILABLE, "down").await;
        let result = client.get_user("some-token").await;
        assert!(matches!(result, Err(SupabaseError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_success_returns_user() {
        let client = auth_stub(StatusCode::OK, USER_JSON).await;
        let user = client.get_user("good-token").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_user_url() {
        let client = SupabaseAuthClient::new(&SupabaseConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: SecretString::from("anon-key"),
        })
        .unwrap();
        assert_eq!(client.user_url, "https://abcd.supabase.co/auth/v1/user");
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let result = SupabaseAuthClient::new(&SupabaseConfig {
            url: "https://abcd.supabase.co".to_string(),
            anon_key: SecretString::from("bad\nkey"),
        });
        assert!(matches!(result, Err(SupabaseError::Parse(_))));
    }

    #[test]
    fn test_auth_user_deserializes_from_user_payload() {
        let json = r#"{
            "id": "0b6c1f3e-8a55-4c52-9a0c-3c2f8b1d9e77",
            "aud": "authenticated",
            "email": "asha@example.com",
            "app_metadata": {"provider": "email"}
        }"#;
        let user: AuthUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
        assert_eq!(user.id.to_string(), "0b6c1f3e-8a55-4c52-9a0c-3c2f8b1d9e77");
    }
}
