//! Access-token verification against the hosted auth API.

use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{AuthUser, SupabaseError, error_for_status};
use crate::config::SupabaseConfig;

/// How long a verified token is trusted without asking the auth service again.
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(60);

const TOKEN_CACHE_CAPACITY: u64 = 1_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies bearer tokens by calling `GET /auth/v1/user`, caching hits.
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

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", config.url),
            cache: Cache::builder()
                .max_capacity(TOKEN_CACHE_CAPACITY)
                .time_to_live(TOKEN_CACHE_TTL)
                .build(),
        })
    }

    /// Resolve the user that owns an access token.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` for any 4xx answer and
    /// `SupabaseError::Api` when the service fails on its side.
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

        // Any 4xx (expired, malformed, or a deleted user) means the token is bad.
        if response.status().is_client_error() {
            return Err(SupabaseError::Unauthorized);
        }

        let user: AuthUser = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;

        self.cache
            .insert(access_token.to_owned(), user.clone())
            .await;
        Ok(user)
    }
}
