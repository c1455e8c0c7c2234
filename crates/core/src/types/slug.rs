//! URL-safe slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lower-case letters, digits and hyphens (found '{0}')")]
    InvalidChar(char),
    /// The input starts or ends with a hyphen, or contains `--`.
    #[error("slug cannot start or end with a hyphen or contain consecutive hyphens")]
    MisplacedHyphen,
}

/// A URL-safe slug such as `hello-world-2024`.
///
/// ## Constraints
///
/// - Non-empty
/// - Only `a-z`, `0-9` and `-`
/// - No leading, trailing or doubled hyphen
///
/// ## Examples
///
/// ```
/// use shodhsutra_core::Slug;
///
/// assert_eq!(Slug::from_title("Hello, World! 2024").as_str(), "hello-world-2024");
/// assert!(Slug::parse("hello-world").is_ok());
/// assert!(Slug::parse("Hello World").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a title.
    ///
    /// Lower-cases the title, collapses every run of characters outside
    /// `[a-z0-9]` into a single hyphen, and trims hyphens from both ends.
    /// A title with no alphanumeric characters yields an empty slug, which
    /// [`Slug::parse`] would reject; callers treat that as "no slug yet".
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut pending_hyphen = false;

        for c in title.trim().to_lowercase().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c);
            } else {
                pending_hyphen = true;
            }
        }

        Self(out)
    }

    /// Parse a slug typed by hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters outside
    /// `[a-z0-9-]`, or has a leading, trailing or doubled hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidChar(bad));
        }

        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the slug has no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
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

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
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
    fn test_from_title_punctuation_and_digits() {
        assert_eq!(
            Slug::from_title("Hello, World! 2024").as_str(),
            "hello-world-2024"
        );
    }

    #[test]
    fn test_from_title_trims_and_collapses_hyphens() {
        let slug = Slug::from_title("--Already--Hyphenated--");
        assert_eq!(slug.as_str(), "already-hyphenated");
        assert!(!slug.as_str().starts_with('-'));
        assert!(!slug.as_str().ends_with('-'));
        assert!(!slug.as_str().contains("--"));
    }

    #[test]
    fn test_from_title_non_ascii_is_separator() {
        assert_eq!(Slug::from_title("Café   Résumé").as_str(), "caf-r-sum");
    }

    #[test]
    fn test_from_title_without_alphanumerics_is_empty() {
        assert!(Slug::from_title("!!! ---").is_empty());
    }

    #[test]
    fn test_derived_slugs_always_parse() {
        for title in ["PhD Admission Guide", "  a  ", "Top 10: Research Tips (2025)"] {
            let slug = Slug::from_title(title);
            assert!(Slug::parse(slug.as_str()).is_ok(), "{title}");
        }
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Hello"), Err(SlugError::InvalidChar('H')));
        assert_eq!(Slug::parse("a b"), Err(SlugError::InvalidChar(' ')));
        assert_eq!(Slug::parse("-a"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("a--b"), Err(SlugError::MisplacedHyphen));
    }
}
