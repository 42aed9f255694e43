//! URL slugs derived from product names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a name yields no slug characters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("name must contain at least one letter or digit")]
pub struct SlugError;

/// A lowercase, hyphen-separated URL slug.
///
/// ```
/// use bhavani_core::Slug;
///
/// let slug = Slug::from_name("Banarasi Silk Saree (Red & Gold)").unwrap();
/// assert_eq!(slug.as_str(), "banarasi-silk-saree-red-gold");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length; longer names are truncated at a word boundary.
    pub const MAX_LENGTH: usize = 96;

    /// Derive a slug from a display name.
    ///
    /// Non-ASCII-alphanumeric runs collapse to a single hyphen; leading and
    /// trailing hyphens are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if the name has no ASCII letters or digits.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            return Err(SlugError);
        }

        if slug.len() > Self::MAX_LENGTH {
            slug.truncate(Self::MAX_LENGTH);
            if let Some(cut) = slug.rfind('-') {
                slug.truncate(cut);
            }
        }

        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build a substring `ILIKE` pattern, escaping the wildcard characters.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_punctuation() {
        let slug = Slug::from_name("  Kurti -- Cotton / Blue!! ").unwrap();
        assert_eq!(slug.as_str(), "kurti-cotton-blue");
    }

    #[test]
    fn test_drops_non_ascii() {
        let slug = Slug::from_name("Chikankari कुर्ता Set").unwrap();
        assert_eq!(slug.as_str(), "chikankari-set");
    }

    #[test]
    fn test_empty_is_error() {
        assert_eq!(Slug::from_name("  --  "), Err(SlugError));
        assert_eq!(Slug::from_name("कुर्ता"), Err(SlugError));
    }

    #[test]
    fn test_truncates_at_word_boundary() {
        let name = "lehenga ".repeat(20);
        let slug = Slug::from_name(&name).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
        assert!(slug.as_str().ends_with("lehenga"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("silk"), "%silk%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
