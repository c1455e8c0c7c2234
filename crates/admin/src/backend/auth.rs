//! Token exchange.

use chrono::{Duration, Utc};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use shodhsutra_core::{ApiToken, Email, IssuedToken};
use tracing::instrument;

use super::{BackendClient, BackendError, LoginRequest, LoginResponse};

/// Lifetime assumed when the backend does not report an expiry.
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 8;

impl BackendClient {
    /// Trade an email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` when the backend rejects the
    /// credentials, or any transport/parse error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<IssuedToken, BackendError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: LoginResponse = self.send_json(Method::POST, "/auth/login", None, &body).await?;

        if response.token.trim().is_empty() {
            return Err(BackendError::Parse("login reply carried an empty token".to_string()));
        }

        let expires_at = response
            .expires_at
            .unwrap_or_else(|| Utc::now() + Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS));

        tracing::info!(%expires_at, "Backend token issued");
        Ok(IssuedToken {
            token: ApiToken::new(response.token),
            expires_at,
        })
    }
}
