//! Database operations for the admin console.
//!
//! The admin service shares the storefront's database. It owns writes to
//! `products` and `product_stock`, reads and triages `contact_messages`,
//! and reads the `is_admin` flag from `profiles`.
//!
//! # Migrations
//!
//! Migrations live in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p bhavani-cli -- migrate
//! ```

pub mod contact_messages;
pub mod dashboard;
pub mod products;
pub mod profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contact_messages::ContactMessageRepository;
pub use dashboard::DashboardRepository;
pub use products::{AdminProductRepository, ProductError};
pub use profiles::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict` and a foreign-key violation to
    /// `NotFound`, keeping anything else as a database error.
    pub(crate) fn from_constraint(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a size label read back from the database.
pub(crate) fn size_from_db(raw: &str) -> Result<bhavani_core::Size, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid size in database: {e}")))
}

/// Validate a price read back from the database.
pub(crate) fn price_from_db(
    raw: rust_decimal::Decimal,
) -> Result<bhavani_core::Price, RepositoryError> {
    bhavani_core::Price::inr(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))
}
