//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::ListQuery;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::{Layout, render};
use crate::services::{SharedCollection, load_for_view};
use crate::state::AppState;

/// One resource tile.
#[derive(Debug, Clone)]
pub struct TileView {
    pub label: &'static str,
    pub href: &'static str,
    pub count: usize,
    /// False when the last load failed and the count may be stale.
    pub current: bool,
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: Layout,
    tiles: Vec<TileView>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn tile<T: shodhsutra_core::Record>(
    label: &'static str,
    href: &'static str,
    cache: &SharedCollection<T>,
    current: bool,
) -> TileView {
    TileView {
        label,
        href,
        count: cache.read().await.len(),
        current,
    }
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip_all, fields(admin = %admin.email))]
async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let backend = state.backend();
    let collections = state.collections();
    let policy = state.reload_policy(query.refresh());
    let token = &admin.token.token;

    let (consultations, appointments, gallery, results) = tokio::join!(
        load_for_view("consultations", &collections.consultations, policy, || backend
            .list_consultations(token)),
        load_for_view("appointments", &collections.appointments, policy, || backend
            .list_appointments(token)),
        load_for_view("gallery", &collections.gallery, policy, || backend.list_gallery(token)),
        load_for_view("results", &collections.results, policy, || backend.list_results(token)),
    );

    let tiles = vec![
        tile("Consultations", "/consultations", &collections.consultations, consultations?).await,
        tile("Appointments", "/appointments", &collections.appointments, appointments?).await,
        tile("Gallery Images", "/gallery", &collections.gallery, gallery?).await,
        tile("Results", "/results", &collections.results, results?).await,
    ];

    let template = DashboardTemplate {
        layout: Layout::new(&admin, "/", &session).await?,
        tiles,
    };
    Ok(render(&template))
}
