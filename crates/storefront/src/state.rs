//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::supabase::{SupabaseAuthClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    auth: SupabaseAuthClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth client cannot be built from the config.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, SupabaseError> {
        let auth = SupabaseAuthClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, auth }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the access-token verifier.
    #[must_use]
    pub fn auth(&self) -> &SupabaseAuthClient {
        &self.inner.auth
    }
}
