//! Admin role lookups and changes on `profiles`.

use sqlx::PgPool;
use tracing::instrument;

use bhavani_core::{Email, UserId};

use super::RepositoryError;

/// Repository for the `is_admin` flag.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether the user has a profile with the admin flag set. Users who
    /// never signed in to the storefront have no profile and are not admins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_admin FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some_and(|(is_admin,)| is_admin))
    }

    /// Grant or revoke the admin role for every profile with this email.
    ///
    /// Returns the number of profiles changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has the email.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn set_admin_by_email(
        &self,
        email: &Email,
        is_admin: bool,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE profiles
            SET is_admin = $2, updated_at = NOW()
            WHERE lower(email) = $1
            ",
        )
        .bind(email.as_str())
        .bind(is_admin)
        .execute(self.pool)
        .await?;

        match result.rows_affected() {
            0 => Err(RepositoryError::NotFound),
            n => Ok(n),
        }
    }
}
