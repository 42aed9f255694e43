//! Customer profiles.

use sqlx::PgPool;
use tracing::instrument;

use bhavani_core::UserId;

use super::RepositoryError;
use crate::models::{Profile, ProfileUpdate};

const PROFILE_COLUMNS: &str = "id, email, full_name, phone, address_line1, address_line2, \
     city, state, postal_code, is_admin, created_at, updated_at";

/// Repository for profile operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the profile for an auth user, creating an empty one on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    #[instrument(skip(self, email), fields(user_id = %user_id))]
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Profile, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row.
        let sql = format!(
            r"
            INSERT INTO profiles (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET email = profiles.email
            RETURNING {PROFILE_COLUMNS}
            "
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(profile)
    }

    /// Apply a validated update. Absent fields keep their value and empty
    /// strings clear them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            r"
            UPDATE profiles SET
                full_name     = CASE WHEN $2::TEXT IS NULL THEN full_name     ELSE NULLIF($2, '') END,
                phone         = CASE WHEN $3::TEXT IS NULL THEN phone         ELSE NULLIF($3, '') END,
                address_line1 = CASE WHEN $4::TEXT IS NULL THEN address_line1 ELSE NULLIF($4, '') END,
                address_line2 = CASE WHEN $5::TEXT IS NULL THEN address_line2 ELSE NULLIF($5, '') END,
                city          = CASE WHEN $6::TEXT IS NULL THEN city          ELSE NULLIF($6, '') END,
                state         = CASE WHEN $7::TEXT IS NULL THEN state         ELSE NULLIF($7, '') END,
                postal_code   = CASE WHEN $8::TEXT IS NULL THEN postal_code   ELSE NULLIF($8, '') END,
                updated_at    = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(update.full_name.as_deref())
            .bind(update.phone.as_deref())
            .bind(update.address_line1.as_deref())
            .bind(update.address_line2.as_deref())
            .bind(update.city.as_deref())
            .bind(update.state.as_deref())
            .bind(update.postal_code.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
