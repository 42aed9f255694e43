//! Contact inbox queries.

use sqlx::PgPool;
use tracing::instrument;

use bhavani_core::ContactMessageId;

use super::RepositoryError;
use crate::models::{ContactMessage, Page};

/// Repository for `contact_messages`.
pub struct ContactMessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactMessageRepository<'a> {
    /// Create a new contact message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List messages newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Page<ContactMessage>, RepositoryError> {
        let items = sqlx::query_as::<_, ContactMessage>(
            r"
            SELECT id, name, email, phone, subject, message, is_read, created_at
            FROM contact_messages
            WHERE NOT $1 OR NOT is_read
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contact_messages WHERE NOT $1 OR NOT is_read")
                .bind(unread_only)
                .fetch_one(self.pool)
                .await?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Mark a message read or unread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn set_read(
        &self,
        id: ContactMessageId,
        is_read: bool,
    ) -> Result<ContactMessage, RepositoryError> {
        sqlx::query_as::<_, ContactMessage>(
            r"
            UPDATE contact_messages SET is_read = $2
            WHERE id = $1
            RETURNING id, name, email, phone, subject, message, is_read, created_at
            ",
        )
        .bind(id)
        .bind(is_read)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn delete(&self, id: ContactMessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
