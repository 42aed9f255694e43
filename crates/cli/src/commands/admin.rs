//! Admin role management.
//!
//! Admins sign in through the hosted auth service like customers. Their
//! profile row is created on first sign-in; these commands only flip the
//! `is_admin` flag on an existing profile.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use bhavani_admin::db::{ProfileRepository, RepositoryError};
use bhavani_core::Email;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No profile found for {0}; the user must sign in once first")]
    NoProfile(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Grant or revoke the admin role for the profile(s) with `email`.
///
/// # Errors
///
/// Returns `AdminError::NoProfile` if nobody with that email has signed in.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("DATABASE_URL"))?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let changed = ProfileRepository::new(&pool)
        .set_admin_by_email(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::NoProfile(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    let action = if is_admin { "promoted" } else { "demoted" };
    tracing::info!(%email, profiles = changed, "Admin {action}");
    Ok(())
}
