//! Garment sizes used for stock-by-size and cart lines.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a size label is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown size '{0}' (expected one of XS, S, M, L, XL, XXL, Free Size)")]
pub struct SizeError(pub String);

/// A garment size.
///
/// The canonical label (see [`Size::as_str`]) is what the `product_stock`
/// and `cart_items` tables store. Parsing is case-insensitive and accepts
/// the common spellings of free size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Size {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
    Free,
}

impl Size {
    /// All sizes in display order.
    pub const ALL: [Self; 7] = [
        Self::Xs,
        Self::S,
        Self::M,
        Self::L,
        Self::Xl,
        Self::Xxl,
        Self::Free,
    ];

    /// Canonical label, as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
            Self::Free => "Free Size",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "XS" => Ok(Self::Xs),
            "S" => Ok(Self::S),
            "M" => Ok(Self::M),
            "L" => Ok(Self::L),
            "XL" => Ok(Self::Xl),
            "XXL" | "2XL" => Ok(Self::Xxl),
            "FREE" | "FREE SIZE" | "FREESIZE" | "FREE-SIZE" | "ONE SIZE" => Ok(Self::Free),
            _ => Err(SizeError(s.trim().to_owned())),
        }
    }
}

impl TryFrom<String> for Size {
    type Error = SizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Size> for String {
    fn from(size: Size) -> Self {
        size.as_str().to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_labels_round_trip() {
        for size in Size::ALL {
            assert_eq!(size.as_str().parse::<Size>().unwrap(), size);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("xl".parse::<Size>().unwrap(), Size::Xl);
        assert_eq!(" m ".parse::<Size>().unwrap(), Size::M);
    }

    #[test]
    fn test_free_size_spellings() {
        for label in ["free", "Free Size", "freesize", "one size"] {
            assert_eq!(label.parse::<Size>().unwrap(), Size::Free, "{label}");
        }
    }

    #[test]
    fn test_unknown_size() {
        let err = "XXXL".parse::<Size>().unwrap_err();
        assert_eq!(err, SizeError("XXXL".to_owned()));
    }

    #[test]
    fn test_serde_uses_canonical_label() {
        assert_eq!(serde_json::to_string(&Size::Free).unwrap(), "\"Free Size\"");
        let size: Size = serde_json::from_str("\"xxl\"").unwrap();
        assert_eq!(size, Size::Xxl);
    }
}
