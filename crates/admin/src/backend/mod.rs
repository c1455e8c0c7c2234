//! HTTP gateway to the Shodhsutra CMS backend.
//!
//! Every console screen and CLI command goes through [`BackendClient`]. The
//! backend issues a bearer token at login; all other calls carry it in the
//! `Authorization` header.
//!
//! # API Reference
//!
//! - Base URL: `BACKEND_API_URL` (default `https://api.shodhsutra.com/api`)
//! - Authentication: `Authorization: Bearer <token>` from `POST /auth/login`
//! - Lists are fetched whole; there is no server-side pagination or search.

mod appointments;
mod auth;
mod consultations;
mod content;
mod gallery;
mod results;
mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shodhsutra_core::ApiToken;
use thiserror::Error;

use crate::config::BackendConfig;

/// Errors that can occur when talking to the CMS backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing, expired or revoked token, or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered 2xx but refused the operation.
    #[error("{0}")]
    Rejected(String),
}

impl BackendError {
    /// Whether the error means the session's token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the backend itself failed (5xx, transport, garbage body).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized | Self::Rejected(_) => false,
        }
    }

    /// Text for an error banner: the backend's own message when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if *status < 500 => message.clone(),
            Self::NotFound(message) | Self::Rejected(message) => message.clone(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::Api { .. } => "Server error. Please try again.".to_string(),
        }
    }
}

/// CMS backend client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shodhsutra-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// The API root every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn request(&self, method: Method, path: &str, token: Option<&ApiToken>) -> reqwest::RequestBuilder {
        let builder = self.inner.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Execute an authenticated GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, token: &ApiToken) -> Result<T, BackendError> {
        let response = self.request(Method::GET, path, Some(token)).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a JSON request and parse the JSON reply.
    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        token: Option<&ApiToken>,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self.request(method, path, token).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a JSON request where any 2xx counts as success.
    pub(crate) async fn send_json_unit<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        token: &ApiToken,
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self.request(method, path, Some(token)).json(body).send().await?;
        Self::expect_success(response).await
    }

    /// Execute a multipart request and return the raw body of a 2xx reply.
    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        token: &ApiToken,
        form: reqwest::multipart::Form,
    ) -> Result<String, BackendError> {
        let response = self.request(method, path, Some(token)).multipart(form).send().await?;
        if response.status().is_success() {
            return Ok(response.text().await?);
        }
        Err(Self::parse_error(response).await)
    }

    /// Execute an authenticated DELETE request.
    pub(crate) async fn delete(&self, path: &str, token: &ApiToken) -> Result<(), BackendError> {
        let response = self.request(Method::DELETE, path, Some(token)).send().await?;
        Self::expect_success(response).await
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| BackendError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse error response from the backend.
    async fn parse_error(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return BackendError::Unauthorized;
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        if status == 404 {
            return BackendError::NotFound(message);
        }

        BackendError::Api { status, message }
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend usually answers `{"message": "..."}`; anything else is passed
/// through as text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.trim().to_string()
            }
        })
}
