//! Backend-issued credential types.
//!
//! The console never sees a password table. It trades the submitted email
//! and password for an opaque, expiring token and keeps only that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer token issued by the CMS backend.
///
/// `Debug` is redacted so the token never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the token for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

/// A token together with the instant it stops being valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// The bearer token.
    pub token: ApiToken,
    /// Expiry reported by the backend.
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let token = ApiToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let issued = IssuedToken {
            token: ApiToken::new("t"),
            expires_at: now + Duration::minutes(5),
        };
        assert!(!issued.is_expired(now));
        assert!(issued.is_expired(now + Duration::minutes(5)));
    }
}
