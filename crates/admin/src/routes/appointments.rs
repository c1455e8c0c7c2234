//! Appointment route handlers (read-only).

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use shodhsutra_core::AppointmentId;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{ListQuery, PagerView};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::{Layout, render};
use crate::services::load_for_view;
use crate::state::AppState;

const BASE_PATH: &str = "/appointments";

/// One table row.
#[derive(Debug, Clone)]
pub struct AppointmentRow {
    pub position: usize,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub date: String,
    pub message: String,
}

/// Appointment list template.
#[derive(Template)]
#[template(path = "appointments/index.html")]
struct AppointmentsTemplate {
    layout: Layout,
    search_term: String,
    rows: Vec<AppointmentRow>,
    pager: PagerView,
}

/// Build the appointments router.
pub fn router() -> Router<AppState> {
    Router::new().route("/appointments", get(index))
}

/// Appointment list page.
///
/// GET /appointments
#[instrument(skip_all, fields(admin = %admin.email))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let cache = &state.collections().appointments;
    let token = &admin.token.token;
    load_for_view("appointments", cache, state.reload_policy(query.refresh()), || {
        state.backend().list_appointments(token)
    })
    .await?;

    let view_state = query.view_state::<AppointmentId>();
    let search_term = view_state.search_term().to_string();

    let collection = cache.read().await;
    let page = collection.view(&view_state);
    let rows = page
        .items()
        .iter()
        .enumerate()
        .map(|(i, appointment)| AppointmentRow {
            position: page.first_position().saturating_add(i),
            name: appointment.name.clone(),
            phone: appointment.phone.clone(),
            location: appointment.location.clone(),
            date: appointment.date_display(),
            message: appointment.message_or_dash().to_string(),
        })
        .collect();
    let pager = PagerView::new(&page, BASE_PATH, &search_term);
    drop(collection);

    let template = AppointmentsTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        search_term,
        rows,
        pager,
    };
    Ok(render(&template))
}
