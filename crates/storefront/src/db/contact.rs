//! Contact form storage.

use sqlx::PgPool;
use tracing::{info, instrument};

use super::RepositoryError;
use crate::models::{ContactReceipt, NewContactMessage};

/// Repository for contact messages.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a submitted message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip_all)]
    pub async fn insert(&self, message: &NewContactMessage) -> Result<ContactReceipt, RepositoryError> {
        let receipt = sqlx::query_as::<_, ContactReceipt>(
            r"
            INSERT INTO contact_messages (name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(message.phone.as_deref())
        .bind(message.subject.as_deref())
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;

        info!(message_id = %receipt.id, "Contact message received");
        Ok(receipt)
    }
}
