//! Authentication middleware and extractors for admin.
//!
//! Provides the extractor that guards every console screen.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, or the backend token has expired, the
/// session is dropped and the request is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but the user is not logged in.
pub enum AdminAuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// No session layer in front of the handler.
    MissingSession,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::MissingSession)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        if admin.token.is_expired(Utc::now()) {
            tracing::info!(email = %admin.email, "Backend token expired, signing out");
            if let Err(e) = session.flush().await {
                tracing::error!(error = %e, "Failed to flush expired session");
            }
            return Err(AdminAuthRejection::RedirectToLogin);
        }

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to drop the current admin and every piece of screen state (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use chrono::Duration;
    use shodhsutra_core::{ApiToken, Email, IssuedToken};
    use tower_sessions::MemoryStore;

    use super::*;

    fn admin(expires_in: Duration) -> CurrentAdmin {
        CurrentAdmin {
            email: Email::parse("admin@shodhsutra.com").unwrap(),
            token: IssuedToken {
                token: ApiToken::new("t"),
                expires_at: Utc::now() + expires_in,
            },
        }
    }

    async fn extract(session: Option<Session>) -> Result<RequireAdminAuth, AdminAuthRejection> {
        let (mut parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        RequireAdminAuth::from_request_parts(&mut parts, &()).await
    }

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_signed_in_admin_is_extracted() {
        let session = new_session();
        set_current_admin(&session, &admin(Duration::hours(1))).await.unwrap();
        let RequireAdminAuth(current) = extract(Some(session)).await.ok().unwrap();
        assert_eq!(current.email.as_str(), "admin@shodhsutra.com");
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected() {
        assert!(matches!(
            extract(Some(new_session())).await,
            Err(AdminAuthRejection::RedirectToLogin)
        ));
        assert!(matches!(extract(None).await, Err(AdminAuthRejection::MissingSession)));
    }

    #[tokio::test]
    async fn test_expired_token_signs_out() {
        let session = new_session();
        set_current_admin(&session, &admin(-Duration::minutes(1))).await.unwrap();
        assert!(matches!(
            extract(Some(session.clone())).await,
            Err(AdminAuthRejection::RedirectToLogin)
        ));
        let left: Option<CurrentAdmin> = session.get(session_keys::CURRENT_ADMIN).await.unwrap();
        assert!(left.is_none());
    }
}
