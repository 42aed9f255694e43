//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bhavani_core::{ContactMessageId, Email};

use super::profile::validate_phone;
use super::{ValidationError, check_length, non_blank};

/// Longest accepted message body.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

const MAX_NAME_LENGTH: usize = 100;
const MAX_SUBJECT_LENGTH: usize = 200;

/// Body of `POST /api/contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A validated contact message ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// Acknowledgement returned to the sender.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactReceipt {
    pub id: ContactMessageId,
    pub created_at: DateTime<Utc>,
}

impl ContactForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing name, email or message, an
    /// invalid email or phone, or an over-long field.
    pub fn validate(self) -> Result<NewContactMessage, ValidationError> {
        let name = non_blank(self.name).ok_or_else(|| ValidationError::required("name"))?;
        check_length("name", &name, MAX_NAME_LENGTH)?;

        let email = non_blank(self.email).ok_or_else(|| ValidationError::required("email"))?;
        let email = Email::parse(&email).map_err(|e| ValidationError::invalid("email", e))?;

        let phone = non_blank(self.phone).map(|p| p.replace([' ', '-'], ""));
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }

        let subject = non_blank(self.subject);
        if let Some(subject) = &subject {
            check_length("subject", subject, MAX_SUBJECT_LENGTH)?;
        }

        let message =
            non_blank(self.message).ok_or_else(|| ValidationError::required("message"))?;
        check_length("message", &message, MAX_MESSAGE_LENGTH)?;

        Ok(NewContactMessage {
            name,
            email,
            phone,
            subject,
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: Some("Lakshmi".to_owned()),
            email: Some("Lakshmi@Example.com".to_owned()),
            phone: None,
            subject: Some("Blouse stitching".to_owned()),
            message: Some("Do you offer custom blouse stitching?".to_owned()),
        }
    }

    #[test]
    fn test_valid_form() {
        let message = form().validate().unwrap();
        assert_eq!(message.email.as_str(), "lakshmi@example.com");
        assert_eq!(message.subject.as_deref(), Some("Blouse stitching"));
    }

    #[test]
    fn test_missing_fields() {
        let err = ContactForm {
            name: Some("   ".to_owned()),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = ContactForm {
            message: None,
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "message is required");
    }

    #[test]
    fn test_invalid_email() {
        let err = ContactForm {
            email: Some("lakshmi-at-example".to_owned()),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().starts_with("email:"));
    }

    #[test]
    fn test_message_length_limit() {
        let at_limit = ContactForm {
            message: Some("a".repeat(MAX_MESSAGE_LENGTH)),
            ..form()
        };
        assert!(at_limit.validate().is_ok());

        let over = ContactForm {
            message: Some("a".repeat(MAX_MESSAGE_LENGTH + 1)),
            ..form()
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let message = ContactForm {
            phone: Some(" ".to_owned()),
            subject: Some(String::new()),
            ..form()
        }
        .validate()
        .unwrap();
        assert!(message.phone.is_none());
        assert!(message.subject.is_none());
    }
}
