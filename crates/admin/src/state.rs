//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::supabase::{SupabaseAuthClient, SupabaseError, SupabaseStorageClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    auth: SupabaseAuthClient,
    storage: SupabaseStorageClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a hosted service client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, SupabaseError> {
        let auth = SupabaseAuthClient::new(&config.supabase)?;
        let storage = SupabaseStorageClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                storage,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Get a reference to the image storage client.
    #[must_use]
    pub fn storage(&self) -> &SupabaseStorageClient {
        &self.inner.storage
    }
}
