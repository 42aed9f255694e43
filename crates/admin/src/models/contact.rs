//! Contact inbox views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bhavani_core::ContactMessageId;

use super::{ValidationError, page_limit, page_offset};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// A message from the public contact form.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Query string of `GET /api/contact-messages`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactMessageQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContactMessageQuery {
    /// Resolve the page window.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a negative offset.
    pub fn page(&self) -> Result<(i64, i64), ValidationError> {
        Ok((
            page_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            page_offset(self.offset)?,
        ))
    }
}

/// Body of `PATCH /api/contact-messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct ContactMessageUpdate {
    pub is_read: Option<bool>,
}

impl ContactMessageUpdate {
    /// # Errors
    ///
    /// Returns `ValidationError` when `is_read` is absent.
    pub fn validate(self) -> Result<bool, ValidationError> {
        self.is_read.ok_or_else(|| ValidationError::required("is_read"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let query = ContactMessageQuery::default();
        assert_eq!(query.page().unwrap(), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_page_clamps_and_rejects_negative_offset() {
        let query = ContactMessageQuery {
            unread_only: true,
            limit: Some(0),
            offset: Some(10),
        };
        assert_eq!(query.page().unwrap(), (1, 10));

        let query = ContactMessageQuery {
            offset: Some(-1),
            ..ContactMessageQuery::default()
        };
        assert!(query.page().is_err());
    }

    #[test]
    fn test_update_requires_flag() {
        let update: ContactMessageUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.validate().unwrap_err().to_string(), "is_read is required");

        let update: ContactMessageUpdate = serde_json::from_str(r#"{"is_read": true}"#).unwrap();
        assert!(update.validate().unwrap());
    }
}
