//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;

use crate::backend::{BackendClient, BackendError};
use crate::config::AdminConfig;
use crate::services::{Collections, ReloadPolicy};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("asset URL not usable in CSP: {0}")]
    InvalidAssetUrl(#[from] InvalidHeaderValue),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the backend client and the shared collection caches.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    collections: Collections,
    content_security_policy: HeaderValue,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built or the
    /// asset URL cannot be placed in a header.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;
        let content_security_policy = content_security_policy(&config.backend.asset_url)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                collections: Collections::default(),
                content_security_policy,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the CMS backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the shared collection caches.
    #[must_use]
    pub fn collections(&self) -> &Collections {
        &self.inner.collections
    }

    /// The CSP header value, which admits images from the backend asset host.
    #[must_use]
    pub fn content_security_policy(&self) -> &HeaderValue {
        &self.inner.content_security_policy
    }

    /// Reload policy for a list screen; `refresh` forces a reload.
    #[must_use]
    pub fn reload_policy(&self, refresh: bool) -> ReloadPolicy {
        ReloadPolicy {
            force: refresh,
            max_age: self.inner.config.collection_max_age,
        }
    }

    /// Base URL uploaded image paths are appended to.
    #[must_use]
    pub fn asset_url(&self) -> &str {
        &self.inner.config.backend.asset_url
    }
}

/// Build the admin CSP.
///
/// Editor previews embed pasted images as `data:` URLs and the gallery shows
/// images straight from the asset host.
fn content_security_policy(asset_url: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let policy = format!(
        "default-src 'none'; \
         script-src 'self'; \
         style-src 'self' 'unsafe-inline'; \
         font-src 'self'; \
         img-src 'self' data: {asset_url}; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    );
    HeaderValue::from_str(&policy)
}
