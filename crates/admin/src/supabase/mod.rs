//! Clients for the hosted auth and storage services.
//!
//! - [`SupabaseAuthClient`] resolves bearer tokens to users (anon key)
//! - [`SupabaseStorageClient`] writes and deletes product images (service-role key)

pub mod auth;
pub mod storage;

use serde::Deserialize;
use thiserror::Error;

use bhavani_core::UserId;

pub use auth::SupabaseAuthClient;
pub use storage::SupabaseStorageClient;

/// Errors that can occur when calling the hosted services.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected.
    #[error("access token rejected")]
    Unauthorized,

    /// API returned an unexpected error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// The authenticated user behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    /// Auth user id, also the `profiles` primary key.
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Turn a non-success response into `SupabaseError::Api`.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SupabaseError::Api {
        status: status.as_u16(),
        message,
    })
}
