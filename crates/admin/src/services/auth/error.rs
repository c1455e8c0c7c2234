//! Admin authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur while signing an admin in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shodhsutra_core::EmailError),

    /// Password field left empty.
    #[error("password is required")]
    MissingPassword,

    /// The backend rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend could not be reached or answered with an error.
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl AdminAuthError {
    /// Message shown on the login form.
    ///
    /// Bad input and rejected credentials look the same to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) | Self::MissingPassword | Self::InvalidCredentials => {
                "Invalid email or password"
            }
            Self::Backend(_) => "Sign-in is unavailable right now. Please try again.",
        }
    }
}

impl From<BackendError> for AdminAuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized
            | BackendError::NotFound(_)
            | BackendError::Api { status: 400..=499, .. } => Self::InvalidCredentials,
            other => Self::Backend(other),
        }
    }
}
