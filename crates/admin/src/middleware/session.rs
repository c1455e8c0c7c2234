//! Session middleware configuration for admin.
//!
//! Sessions live in memory (tower-sessions `MemoryStore`) with strict cookie
//! settings (SameSite=Strict, 8hr inactivity expiry). A restart signs every
//! admin out, which only costs them a new login.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::error::{RevokeSession, clear_sentry_user};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ss_admin_session";

/// Session expiry time in seconds (8 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Flush the session when a handler marked the response with
/// [`RevokeSession`].
pub async fn revoke_session_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<RevokeSession>().is_some() {
        if let Err(e) = session.flush().await {
            tracing::error!(error = %e, "Failed to flush revoked session");
        }
        clear_sentry_user();
    }

    response
}
