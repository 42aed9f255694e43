//! Domain models for the admin API.

pub mod contact;
pub mod dashboard;
pub mod product;
pub mod upload;

use thiserror::Error;

pub use contact::{ContactMessage, ContactMessageQuery, ContactMessageUpdate};
pub use dashboard::{Dashboard, LowStockItem, ProductCounts};
pub use product::{
    AdminProduct, NewProduct, Page, ProductInput, ProductListFilter, ProductListQuery,
    ProductPatch, StockAdjustment, StockEntry, StockInput, ValidatedPatch,
};
pub use upload::ImageKind;

/// A request payload failed validation. The message is shown to the admin.
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

/// Clamp a requested page size into `1..=max`, defaulting when absent.
pub(crate) fn page_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

/// Reject a negative offset.
pub(crate) fn page_offset(requested: Option<i64>) -> Result<i64, ValidationError> {
    match requested {
        Some(offset) if offset < 0 => Err(ValidationError::invalid("offset", "cannot be negative")),
        other => Ok(other.unwrap_or(0)),
    }
}
