//! Route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /auth/login                      - Login page
//! POST /auth/login                      - Exchange credentials for a backend token
//! POST /auth/logout                     - Drop the session
//!
//! # Dashboard
//! GET  /                                - Totals per resource
//!
//! # Consultations
//! GET  /consultations                   - Search, paginate, view details
//! GET  /consultations/{id}/delete       - Confirm delete
//! POST /consultations/{id}/delete       - Delete
//!
//! # Appointments
//! GET  /appointments                    - Read-only list
//!
//! # Gallery
//! GET  /gallery                         - Images and upload slot
//! POST /gallery/upload                  - Upload or replace (multipart `image`)
//! POST /gallery/{id}/replace            - Switch the slot to replace mode
//! POST /gallery/replace/cancel          - Leave replace mode
//! POST /gallery/banner/dismiss          - Hide the banner
//! GET  /gallery/{id}/delete             - Confirm delete
//! POST /gallery/{id}/delete             - Delete
//!
//! # Drafts (blogs and case studies)
//! GET  /blogs/new                       - Editor
//! POST /blogs/new/edit                  - Metadata + one editor command
//! POST /blogs/new/image                 - Featured image (multipart)
//! POST /blogs/new/inline-image          - Image into the body (multipart)
//! POST /blogs/new/submit                - Validate and create
//! (same under /case-studies/new)
//!
//! # Results
//! GET  /results                         - Search, paginate
//! GET  /results/{id}/edit               - Open a working copy
//! POST /results/{id}/edit               - Apply the form, add a subject or save
//! ```

pub mod appointments;
pub mod auth;
pub mod consultations;
pub mod dashboard;
pub mod drafts;
pub mod gallery;
pub mod results;

use askama::Template;
use axum::{Router, extract::Multipart, response::Html};
use shodhsutra_core::PendingFile;
use tower_sessions::Session;

use crate::components::BannerView;
use crate::error::AppError;
use crate::models::{CurrentAdmin, take_flash};
use crate::state::AppState;

/// Build every console route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(consultations::router())
        .merge(appointments::router())
        .merge(gallery::router())
        .merge(drafts::router())
        .merge(results::router())
}

/// Page chrome shared by every signed-in screen.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_email: String,
    pub current_path: &'static str,
    /// One-shot notification queued by the previous request.
    pub flash: Option<BannerView>,
}

impl Layout {
    /// Build the chrome and consume the pending notification.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be read.
    pub async fn new(admin: &CurrentAdmin, current_path: &'static str, session: &Session) -> Result<Self, AppError> {
        let flash = take_flash(session).await?.map(BannerView::from);
        Ok(Self {
            admin_email: admin.email.to_string(),
            current_path,
            flash,
        })
    }

    /// Whether a nav entry belongs to the current screen.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

/// Render a template, logging and masking render failures.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Read the file sent in multipart field `name`.
///
/// An empty file input counts as no file.
pub(crate) async fn read_file_field(mut multipart: Multipart, name: &str) -> Result<Option<PendingFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(name) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;

        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(PendingFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}
