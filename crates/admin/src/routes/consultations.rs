//! Consultation request route handlers.
//!
//! Lists the PhD consultation requests submitted through the public site.
//! The admin may search, page through, open and delete them.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;
use shodhsutra_core::{ConsultationId, ConsultationRequest, StatusBanner};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{ListQuery, PagerView, list_query, page_href};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::set_flash;
use crate::routes::{Layout, render};
use crate::services::load_for_view;
use crate::state::AppState;

const BASE_PATH: &str = "/consultations";

// =============================================================================
// View Types
// =============================================================================

/// One table row.
#[derive(Debug, Clone)]
pub struct ConsultationRow {
    pub position: usize,
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub created_on: String,
    pub view_href: String,
    pub delete_href: String,
}

/// The detail panel.
#[derive(Debug, Clone)]
pub struct ConsultationDetail {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_on: String,
}

impl From<&ConsultationRequest> for ConsultationDetail {
    fn from(request: &ConsultationRequest) -> Self {
        Self {
            id: request.id.to_string(),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            message: request.message_or_placeholder().to_string(),
            created_on: request.created_on(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Consultation list template.
#[derive(Template)]
#[template(path = "consultations/index.html")]
struct ConsultationsTemplate {
    layout: Layout,
    search_term: String,
    rows: Vec<ConsultationRow>,
    selected: Option<ConsultationDetail>,
    pager: PagerView,
    /// Link that closes the detail panel and keeps search and page.
    close_href: String,
}

/// Delete confirmation template.
#[derive(Template)]
#[template(path = "consultations/confirm_delete.html")]
struct ConfirmDeleteTemplate {
    layout: Layout,
    action: String,
    /// Name of the requester, when the record is cached.
    full_name: Option<String>,
    search_term: String,
    page: String,
    cancel_href: String,
}

// =============================================================================
// Request Types
// =============================================================================

/// Where to return after a delete.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    page: Option<String>,
}

impl ReturnTo {
    fn href(&self) -> String {
        let term = self.q.as_deref().map_or("", str::trim);
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1);
        page_href(BASE_PATH, term, page)
    }
}

/// Build the consultations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultations", get(index))
        .route("/consultations/{id}/delete", get(confirm_delete).post(delete))
}

// =============================================================================
// Handlers
// =============================================================================

/// Consultation list page.
///
/// GET /consultations
#[instrument(skip_all, fields(admin = %admin.email))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let cache = &state.collections().consultations;
    let token = &admin.token.token;
    load_for_view("consultations", cache, state.reload_policy(query.refresh()), || {
        state.backend().list_consultations(token)
    })
    .await?;

    let view_state = query.view_state::<ConsultationId>();
    let search_term = view_state.search_term().to_string();
    let return_query = list_query(&search_term, view_state.page());

    let collection = cache.read().await;
    let page = collection.view(&view_state);
    let rows = page
        .items()
        .iter()
        .enumerate()
        .map(|(i, request)| ConsultationRow {
            position: page.first_position().saturating_add(i),
            id: request.id.to_string(),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            created_on: request.created_on(),
            view_href: format!(
                "{BASE_PATH}?{return_query}&selected={}",
                urlencoding::encode(request.id.as_str())
            ),
            delete_href: format!(
                "{BASE_PATH}/{}/delete?{return_query}",
                urlencoding::encode(request.id.as_str())
            ),
        })
        .collect();
    let selected = page.selected().map(ConsultationDetail::from);
    let pager = PagerView::new(&page, BASE_PATH, &search_term);
    drop(collection);

    let template = ConsultationsTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        search_term,
        rows,
        selected,
        pager,
        close_href: format!("{BASE_PATH}?{return_query}"),
    };
    Ok(render(&template))
}

/// Ask before deleting.
///
/// GET /consultations/{id}/delete
async fn confirm_delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(back): Query<ReturnTo>,
) -> Result<Html<String>, AppError> {
    let id = ConsultationId::new(id);
    let full_name = state
        .collections()
        .consultations
        .read()
        .await
        .find(&id)
        .map(|request| request.full_name.clone());

    let template = ConfirmDeleteTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        action: format!("{BASE_PATH}/{}/delete", urlencoding::encode(id.as_str())),
        full_name,
        cancel_href: back.href(),
        search_term: back.q.unwrap_or_default(),
        page: back.page.unwrap_or_default(),
    };
    Ok(render(&template))
}

/// Delete a consultation request.
///
/// POST /consultations/{id}/delete
#[instrument(skip(admin, state, session, back), fields(admin = %admin.email))]
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(back): Form<ReturnTo>,
) -> Result<Redirect, AppError> {
    let id = ConsultationId::new(id);

    match state.backend().delete_consultation(&admin.token.token, &id).await {
        Ok(()) => {
            state.collections().consultations.write().await.remove(&id);
            tracing::info!(id = %id, "Consultation deleted");
            set_flash(&session, StatusBanner::success("Consultation deleted")).await?;
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to delete consultation");
            set_flash(&session, StatusBanner::error(e.user_message())).await?;
        }
    }

    Ok(Redirect::to(&back.href()))
}
