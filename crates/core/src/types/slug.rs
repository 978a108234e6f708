//! URL-safe slugs for categories and products.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when deriving a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The name contains no characters that survive slugification.
    #[error("name must contain at least one letter or digit")]
    Empty,
}

/// A lower-case, hyphen-separated, ASCII-only identifier.
///
/// ```
/// use chirag_core::Slug;
///
/// let slug = Slug::from_name("Rose Gold  Infinity Ring!").unwrap();
/// assert_eq!(slug.as_str(), "rose-gold-infinity-ring");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// Letters and digits are kept (lower-cased), every other run of
    /// characters collapses into a single hyphen, and leading/trailing
    /// hyphens are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if nothing is left.
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
            return Err(SlugError::Empty);
        }
        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the slug and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_names() {
        assert_eq!(Slug::from_name("Rings").unwrap().as_str(), "rings");
        assert_eq!(
            Slug::from_name("Classic Gold Solitaire Ring").unwrap().as_str(),
            "classic-gold-solitaire-ring"
        );
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(
            Slug::from_name("  --Diamond & Pearl -- Set--  ").unwrap().as_str(),
            "diamond-pearl-set"
        );
    }

    #[test]
    fn test_drops_non_ascii() {
        assert_eq!(Slug::from_name("Kundan Jhumka – 22K").unwrap().as_str(), "kundan-jhumka-22k");
    }

    #[test]
    fn test_empty() {
        assert_eq!(Slug::from_name("   "), Err(SlugError::Empty));
        assert_eq!(Slug::from_name("%%%"), Err(SlugError::Empty));
    }
}
