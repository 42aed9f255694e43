//! Product publication status.

use serde::{Deserialize, Serialize};

/// Whether a product is visible in the public catalog.
///
/// Stored as the `products.is_draft` boolean; this enum is the API-facing
/// view of that flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Hidden from the storefront, editable in the admin console.
    #[default]
    Draft,
    /// Listed in the public catalog.
    Published,
}

impl ProductStatus {
    /// Build from the `is_draft` column.
    #[must_use]
    pub const fn from_is_draft(is_draft: bool) -> Self {
        if is_draft { Self::Draft } else { Self::Published }
    }

    /// Value for the `is_draft` column.
    #[must_use]
    pub const fn is_draft(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_draft_round_trip() {
        assert_eq!(ProductStatus::from_is_draft(true), ProductStatus::Draft);
        assert_eq!(ProductStatus::from_is_draft(false), ProductStatus::Published);
        assert!(ProductStatus::Draft.is_draft());
        assert!(!ProductStatus::Published.is_draft());
    }

    #[test]
    fn test_from_str_display() {
        for status in [ProductStatus::Draft, ProductStatus::Published] {
            assert_eq!(status.to_string().parse::<ProductStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ProductStatus>().is_err());
    }
}
