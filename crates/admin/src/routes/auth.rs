//! Authentication route handlers for admin.
//!
//! Provides the login form and logout. Credentials are exchanged for a
//! backend token; nothing is checked locally beyond the form shape.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::routes::render;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    email: String,
    error: Option<String>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page() -> impl IntoResponse {
    render(&LoginPageTemplate {
        email: String::new(),
        error: None,
    })
}

/// Exchange credentials for a backend token and start a session.
///
/// POST /auth/login
async fn login(State(state): State<AppState>, session: Session, Form(form): Form<LoginForm>) -> Result<Response, AppError> {
    let password = SecretString::from(form.password);

    match AdminAuthService::new(state.backend()).login(&form.email, &password).await {
        Ok(admin) => {
            // New session id on privilege change
            session.cycle_id().await?;
            set_current_admin(&session, &admin).await?;
            set_sentry_user(admin.email.as_str());
            tracing::info!(email = %admin.email, "Admin signed in");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(email = %form.email, error = %e, "Admin sign-in failed");
            Ok(render(&LoginPageTemplate {
                email: form.email,
                error: Some(e.user_message().to_string()),
            })
            .into_response())
        }
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();

    Redirect::to("/auth/login")
}
