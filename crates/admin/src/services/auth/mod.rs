//! Admin authentication service.
//!
//! Exchanges the login form for a backend-issued token. The console holds no
//! credential table; whatever the backend accepts is an admin.

mod error;

pub use error::AdminAuthError;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use shodhsutra_core::Email;

use crate::backend::BackendClient;
use crate::models::CurrentAdmin;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Validate the form input and trade it for a session identity.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail` or `MissingPassword` before any
    /// network call, `InvalidCredentials` when the backend refuses the pair,
    /// and `Backend` for transport or server failures.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse_normalized(email)?;
        if password.expose_secret().is_empty() {
            return Err(AdminAuthError::MissingPassword);
        }

        let token = self.backend.login(&email, password).await?;
        if token.is_expired(Utc::now()) {
            tracing::warn!(email = %email, "Backend issued an already expired token");
            return Err(AdminAuthError::InvalidCredentials);
        }

        Ok(CurrentAdmin { email, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;

    #[test]
    fn test_backend_rejections_are_invalid_credentials() {
        assert!(matches!(
            AdminAuthError::from(BackendError::Unauthorized),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            AdminAuthError::from(BackendError::Api {
                status: 400,
                message: "bad".into()
            }),
            AdminAuthError::InvalidCredentials
        ));
        assert!(matches!(
            AdminAuthError::from(BackendError::Api {
                status: 503,
                message: "down".into()
            }),
            AdminAuthError::Backend(_)
        ));
    }

    #[test]
    fn test_user_message_does_not_leak_which_part_failed() {
        assert_eq!(
            AdminAuthError::MissingPassword.user_message(),
            AdminAuthError::InvalidCredentials.user_message()
        );
        assert_eq!(AdminAuthError::InvalidCredentials.user_message(), "Invalid email or password");
    }
}
