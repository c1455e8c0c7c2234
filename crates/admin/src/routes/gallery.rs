//! Gallery route handlers.
//!
//! The gallery has one upload slot per admin session. It either adds a new
//! image or, after "Replace" was chosen on a tile, swaps the file behind an
//! existing one. Its banner is shown until dismissed or replaced.

use askama::Template;
use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use shodhsutra_core::{GalleryImageId, StatusBanner, UploadSlot};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{BannerView, ListQuery};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::session_keys;
use crate::routes::{Layout, read_file_field, render};
use crate::services::{ensure_fresh, load_for_view};
use crate::state::AppState;

const BASE_PATH: &str = "/gallery";

/// Multipart field the upload form sends the file in.
const IMAGE_FIELD: &str = "image";

// =============================================================================
// View Types
// =============================================================================

/// One image tile.
#[derive(Debug, Clone)]
pub struct ImageTile {
    pub id: String,
    pub src: String,
    /// This image is the replace target.
    pub replacing: bool,
}

// =============================================================================
// Templates
// =============================================================================

/// Gallery page template.
#[derive(Template)]
#[template(path = "gallery/index.html")]
struct GalleryTemplate {
    layout: Layout,
    images: Vec<ImageTile>,
    banner: Option<BannerView>,
    /// Id of the image being replaced.
    replace_target: Option<String>,
}

/// Delete confirmation template.
#[derive(Template)]
#[template(path = "gallery/confirm_delete.html")]
struct ConfirmDeleteTemplate {
    layout: Layout,
    action: String,
    src: Option<String>,
}

/// Build the gallery router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(index))
        .route("/gallery/upload", post(upload))
        .route("/gallery/{id}/replace", post(prepare_replace))
        .route("/gallery/replace/cancel", post(cancel_replace))
        .route("/gallery/banner/dismiss", post(dismiss_banner))
        .route("/gallery/{id}/delete", get(confirm_delete).post(delete))
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_slot(session: &Session) -> Result<UploadSlot, AppError> {
    Ok(session
        .get::<UploadSlot>(session_keys::GALLERY_SLOT)
        .await?
        .unwrap_or_default())
}

async fn save_slot(session: &Session, slot: &UploadSlot) -> Result<(), AppError> {
    session.insert(session_keys::GALLERY_SLOT, slot).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Gallery page.
///
/// GET /gallery
#[instrument(skip_all, fields(admin = %admin.email))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let cache = &state.collections().gallery;
    let token = &admin.token.token;
    let loaded = load_for_view("gallery", cache, state.reload_policy(query.refresh()), || {
        state.backend().list_gallery(token)
    })
    .await?;

    let mut slot = load_slot(&session).await?;
    if !loaded {
        slot.set_banner(StatusBanner::error("Failed to fetch images"));
        save_slot(&session, &slot).await?;
    }

    let target = slot.target();
    let images = cache
        .read()
        .await
        .items()
        .iter()
        .map(|image| ImageTile {
            id: image.id.to_string(),
            src: image.src(state.asset_url()),
            replacing: target == Some(&image.id),
        })
        .collect();

    let template = GalleryTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        images,
        banner: slot.banner().map(BannerView::from),
        replace_target: target.map(ToString::to_string),
    };
    Ok(render(&template))
}

/// Upload a new image or replace the target.
///
/// POST /gallery/upload
#[instrument(skip_all, fields(admin = %admin.email))]
async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut slot = load_slot(&session).await?;
    if let Some(file) = read_file_field(multipart, IMAGE_FIELD).await? {
        slot.select_file(file);
    }

    let request = match slot.submit() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(error = %e, "Upload rejected before sending");
            save_slot(&session, &slot).await?;
            return Ok(Redirect::to(BASE_PATH));
        }
    };

    let token = &admin.token.token;
    let cache = &state.collections().gallery;
    let succeeded = match state.backend().send_upload(token, &request).await {
        Ok(Some(record)) => {
            cache.write().await.upsert(record);
            true
        }
        Ok(None) => {
            // No record in the reply: one full reload
            let reload = ensure_fresh(cache, state.reload_policy(true), || {
                state.backend().list_gallery(token)
            })
            .await;
            if let Err(e) = reload {
                if e.is_unauthorized() {
                    return Err(e.into());
                }
                tracing::error!(error = %e, "Failed to reload gallery after upload");
            }
            true
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Gallery upload failed");
            false
        }
    };

    slot.complete(succeeded);
    save_slot(&session, &slot).await?;
    Ok(Redirect::to(BASE_PATH))
}

/// Switch the slot into replace mode.
///
/// POST /gallery/{id}/replace
async fn prepare_replace(
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let mut slot = load_slot(&session).await?;
    slot.prepare_replace(GalleryImageId::new(id));
    save_slot(&session, &slot).await?;
    Ok(Redirect::to(BASE_PATH))
}

/// Leave replace mode.
///
/// POST /gallery/replace/cancel
async fn cancel_replace(RequireAdminAuth(_admin): RequireAdminAuth, session: Session) -> Result<Redirect, AppError> {
    let mut slot = load_slot(&session).await?;
    slot.cancel_replace();
    save_slot(&session, &slot).await?;
    Ok(Redirect::to(BASE_PATH))
}

/// Hide the banner.
///
/// POST /gallery/banner/dismiss
async fn dismiss_banner(RequireAdminAuth(_admin): RequireAdminAuth, session: Session) -> Result<Redirect, AppError> {
    let mut slot = load_slot(&session).await?;
    slot.dismiss();
    save_slot(&session, &slot).await?;
    Ok(Redirect::to(BASE_PATH))
}

/// Ask before deleting.
///
/// GET /gallery/{id}/delete
async fn confirm_delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = GalleryImageId::new(id);
    let src = state
        .collections()
        .gallery
        .read()
        .await
        .find(&id)
        .map(|image| image.src(state.asset_url()));

    let template = ConfirmDeleteTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        action: format!("{BASE_PATH}/{}/delete", urlencoding::encode(id.as_str())),
        src,
    };
    Ok(render(&template))
}

/// Delete an image.
///
/// POST /gallery/{id}/delete
#[instrument(skip(admin, state, session), fields(admin = %admin.email))]
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = GalleryImageId::new(id);
    let mut slot = load_slot(&session).await?;

    match state.backend().delete_image(&admin.token.token, &id).await {
        Ok(()) => {
            state.collections().gallery.write().await.remove(&id);
            if slot.target() == Some(&id) {
                slot.cancel_replace();
            }
            tracing::info!(id = %id, "Gallery image deleted");
            slot.set_banner(StatusBanner::success("Image deleted successfully!"));
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to delete gallery image");
            slot.set_banner(StatusBanner::error("Failed to delete image!"));
        }
    }

    save_slot(&session, &slot).await?;
    Ok(Redirect::to(BASE_PATH))
}
