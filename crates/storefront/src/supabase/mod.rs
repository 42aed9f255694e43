//! Client for the hosted auth service.
//!
//! The storefront never sees passwords. Customers sign in against the
//! hosted auth service directly and send the resulting access token as a
//! bearer token; this module asks the service who the token belongs to.

pub mod auth;

use serde::Deserialize;
use thiserror::Error;

use bhavani_core::UserId;

pub use auth::SupabaseAuthClient;

/// Errors that can occur when calling the hosted service.
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
    /// Email the user signed up with (absent for phone-only accounts).
    #[serde(default)]
    pub email: Option<String>,
}
