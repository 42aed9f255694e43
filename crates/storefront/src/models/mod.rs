//! Domain models for the storefront API.
//!
//! Request payloads arrive with every field optional so that a missing
//! field is reported as a validation error instead of a deserialization
//! failure; `validate` methods turn them into checked values.

pub mod cart;
pub mod contact;
pub mod product;
pub mod profile;
pub mod wishlist;

use thiserror::Error;

pub use cart::{Cart, CartError, CartLine};
pub use contact::{ContactForm, ContactReceipt, NewContactMessage};
pub use product::{
    CatalogFilter, CatalogQuery, CatalogSort, CategoryCount, Page, ProductDetail,
    ProductSummary, StockLevel,
};
pub use profile::{Profile, ProfileUpdate};
pub use wishlist::WishlistEntry;

/// A request payload failed validation.
///
/// The message is safe to show to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// A required field was missing or blank.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self(format!("{field} is required"))
    }

    /// A field was present but not acceptable.
    #[must_use]
    pub fn invalid(field: &str, reason: impl std::fmt::Display) -> Self {
        Self(format!("{field}: {reason}"))
    }
}

/// Trim an optional text field, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Reject text longer than `max` characters.
pub(crate) fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::invalid(
            field,
            format_args!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Asha ".to_owned())), Some("Asha".to_owned()));
        assert_eq!(non_blank(Some("   ".to_owned())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_check_length_counts_chars() {
        // five multi-byte characters
        assert!(check_length("name", "ಭವಾನಿ", 6).is_ok());
        assert!(check_length("name", "abcdefg", 6).is_err());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");
        assert_eq!(
            ValidationError::invalid("phone", "must contain 10-15 digits").to_string(),
            "phone: must contain 10-15 digits"
        );
    }
}
