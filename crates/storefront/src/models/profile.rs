//! Customer profile and profile edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bhavani_core::UserId;

use super::{ValidationError, check_length};

const MAX_NAME_LENGTH: usize = 100;
const MAX_ADDRESS_FIELD_LENGTH: usize = 200;

/// A customer profile, keyed by the auth user id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /api/profile`.
///
/// Absent fields are left unchanged; an empty string clears the field.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl ProfileUpdate {
    /// Trim every field and check phone, postal code and lengths.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_owned());
        let update = Self {
            full_name: trim(self.full_name),
            phone: trim(self.phone).map(|p| p.replace([' ', '-'], "")),
            address_line1: trim(self.address_line1),
            address_line2: trim(self.address_line2),
            city: trim(self.city),
            state: trim(self.state),
            postal_code: trim(self.postal_code),
        };

        if let Some(name) = &update.full_name {
            check_length("full_name", name, MAX_NAME_LENGTH)?;
        }
        for (field, value) in [
            ("address_line1", &update.address_line1),
            ("address_line2", &update.address_line2),
            ("city", &update.city),
            ("state", &update.state),
        ] {
            if let Some(value) = value {
                check_length(field, value, MAX_ADDRESS_FIELD_LENGTH)?;
            }
        }
        if let Some(phone) = update.phone.as_deref().filter(|p| !p.is_empty()) {
            validate_phone(phone)?;
        }
        if let Some(pin) = update.postal_code.as_deref().filter(|p| !p.is_empty()) {
            validate_postal_code(pin)?;
        }

        Ok(update)
    }
}

/// 10 to 15 digits with an optional leading `+`.
///
/// # Errors
///
/// Returns `ValidationError` if the number does not have that shape.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !(10..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid(
            "phone",
            "must contain 10-15 digits with an optional leading +",
        ));
    }
    Ok(())
}

/// Six-digit Indian PIN code, not starting with zero.
fn validate_postal_code(pin: &str) -> Result<(), ValidationError> {
    let valid = pin.len() == 6
        && pin.bytes().all(|b| b.is_ascii_digit())
        && !pin.starts_with('0');
    if !valid {
        return Err(ValidationError::invalid(
            "postal_code",
            "must be a 6-digit PIN code",
        ));
    }
    Ok(())
}
