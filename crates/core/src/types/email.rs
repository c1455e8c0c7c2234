//! Admin email address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a submitted address was refused before any backend call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must have exactly one @ with text on both sides")]
    Malformed,
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// Address typed into the login form, trimmed and lower-cased.
///
/// Only structural checks are made here; the backend decides whether the
/// account exists.
///
/// ```
/// use shodhsutra_core::Email;
///
/// let email = Email::parse_normalized(" Admin@Shodhsutra.com ").unwrap();
/// assert_eq!(email.as_str(), "admin@shodhsutra.com");
/// assert!(Email::parse("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Check an address as given.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first structural problem.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong { max: Self::MAX_LENGTH });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }
        match s.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Trim and lower-case before checking, as the login form does.
    ///
    /// # Errors
    ///
    /// Same as [`Email::parse`].
    pub fn parse_normalized(s: &str) -> Result<Self, EmailError> {
        Self::parse(&s.trim().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for ok in ["admin@shodhsutra.com", "scholar.name+tag@uni.ac.in", "a@b"] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_structural_problems() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("not-an-email"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@shodhsutra.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("admin@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ad min@x.com"), Err(EmailError::Whitespace));
    }

    #[test]
    fn test_length_limit() {
        let long = format!("{}@shodhsutra.com", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong { max: 254 }));
    }

    #[test]
    fn test_normalized_login_input() {
        let email = Email::parse_normalized("  Admin@Shodhsutra.COM\n").unwrap();
        assert_eq!(email.to_string(), "admin@shodhsutra.com");
    }
}
