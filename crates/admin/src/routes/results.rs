//! Student result route handlers.
//!
//! Results are listed like the other collections. Editing works on a working
//! copy kept in the session: every post applies the whole form to it, then
//! either appends a subject or saves.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
};
use shodhsutra_core::{MarkColumn, ResultEditor, ResultId, SheetField, StatusBanner, SubjectRow};
use tower_sessions::Session;
use tracing::instrument;

use crate::components::{ListQuery, PagerView};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{session_keys, set_flash};
use crate::routes::{Layout, render};
use crate::services::load_for_view;
use crate::state::AppState;

const BASE_PATH: &str = "/results";

// =============================================================================
// View Types
// =============================================================================

/// One table row.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub enrollment_no: String,
    pub course: String,
    pub status: String,
}

/// One header field on the edit form.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// One subject row on the edit form. Missing marks render as blanks.
#[derive(Debug, Clone)]
pub struct SubjectView {
    pub index: usize,
    pub sno: u32,
    pub name: String,
    pub full: String,
    pub pass: String,
    pub obtained: String,
}

fn mark(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl SubjectView {
    fn new(index: usize, row: &SubjectRow) -> Self {
        Self {
            index,
            sno: row.sno,
            name: row.name.clone(),
            full: mark(row.full),
            pass: mark(row.pass),
            obtained: mark(row.obtained),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Result list template.
#[derive(Template)]
#[template(path = "results/index.html")]
struct ResultsTemplate {
    layout: Layout,
    search_term: String,
    rows: Vec<ResultRow>,
    pager: PagerView,
}

/// Result edit template.
#[derive(Template)]
#[template(path = "results/edit.html")]
struct ResultEditTemplate {
    layout: Layout,
    id: String,
    fields: Vec<FieldView>,
    subjects: Vec<SubjectView>,
    total_full: u32,
    total_pass: u32,
    total_obt: u32,
}

/// Build the results router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/results", get(index))
        .route("/results/{id}/edit", get(edit_page).post(update))
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The working copy for `id`, if the session holds one.
async fn load_editor(session: &Session, id: &ResultId) -> Result<Option<ResultEditor>, AppError> {
    let editor: Option<ResultEditor> = session.get(session_keys::RESULT_EDITOR).await?;
    Ok(editor.filter(|editor| editor.id() == id))
}

async fn save_editor(session: &Session, editor: &ResultEditor) -> Result<(), AppError> {
    session.insert(session_keys::RESULT_EDITOR, editor).await?;
    Ok(())
}

/// Apply every field of the posted form to the working copy.
///
/// Subject fields are `subject_name_{i}`, `subject_full_{i}`,
/// `subject_pass_{i}` and `subject_obtained_{i}`; a blank or non-numeric
/// mark clears it.
fn apply_form(editor: &mut ResultEditor, form: &HashMap<String, String>) {
    for field in SheetField::ALL {
        if let Some(value) = form.get(field.key()) {
            editor.set_field(field, value.clone());
        }
    }

    for (key, value) in form {
        let Some((column, index)) = key.strip_prefix("subject_").and_then(|rest| rest.rsplit_once('_')) else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let number = value.trim().parse::<u32>().ok();
        match column {
            "name" => editor.set_subject_name(index, value.clone()),
            "full" => editor.set_subject_mark(index, MarkColumn::Full, number),
            "pass" => editor.set_subject_mark(index, MarkColumn::Pass, number),
            "obtained" => editor.set_subject_mark(index, MarkColumn::Obtained, number),
            _ => {}
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Result list page.
///
/// GET /results
#[instrument(skip_all, fields(admin = %admin.email))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let cache = &state.collections().results;
    let token = &admin.token.token;
    load_for_view("results", cache, state.reload_policy(query.refresh()), || {
        state.backend().list_results(token)
    })
    .await?;

    let view_state = query.view_state::<ResultId>();
    let search_term = view_state.search_term().to_string();

    let collection = cache.read().await;
    let page = collection.view(&view_state);
    let rows = page
        .items()
        .iter()
        .enumerate()
        .map(|(i, record)| ResultRow {
            position: page.first_position().saturating_add(i),
            id: record.id.to_string(),
            name: record.result.name.clone(),
            roll_no: record.result.roll_no.clone(),
            enrollment_no: record.result.enrollment_no.clone(),
            course: record.result.course.clone(),
            status: record.result.status.clone(),
        })
        .collect();
    let pager = PagerView::new(&page, BASE_PATH, &search_term);
    drop(collection);

    let template = ResultsTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        search_term,
        rows,
        pager,
    };
    Ok(render(&template))
}

/// Result edit page. Opens a fresh working copy unless one for this result
/// is already in progress.
///
/// GET /results/{id}/edit
#[instrument(skip(admin, state, session), fields(admin = %admin.email))]
async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = ResultId::new(id);

    let editor = if let Some(editor) = load_editor(&session, &id).await? {
        editor
    } else {
        let record = state.backend().get_result(&admin.token.token, &id).await?;
        let editor = ResultEditor::open(&record);
        state.collections().results.write().await.upsert(record);
        save_editor(&session, &editor).await?;
        editor
    };

    let sheet = editor.sheet();
    let template = ResultEditTemplate {
        layout: Layout::new(&admin, BASE_PATH, &session).await?,
        id: id.to_string(),
        fields: SheetField::ALL
            .into_iter()
            .map(|field| FieldView {
                key: field.key(),
                label: field.label(),
                value: sheet.field(field).to_string(),
            })
            .collect(),
        subjects: sheet
            .subjects
            .iter()
            .enumerate()
            .map(|(i, row)| SubjectView::new(i, row))
            .collect(),
        total_full: sheet.total_full,
        total_pass: sheet.total_pass,
        total_obt: sheet.total_obt,
    };
    Ok(render(&template))
}

/// Apply the form; then add a subject, discard, or save.
///
/// POST /results/{id}/edit
#[instrument(skip(admin, state, session, form), fields(admin = %admin.email))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let id = ResultId::new(id);
    let edit_path = format!("{BASE_PATH}/{}/edit", urlencoding::encode(id.as_str()));

    let Some(mut editor) = load_editor(&session, &id).await? else {
        // Nothing in progress (expired or another result opened since)
        set_flash(&session, StatusBanner::info("The edit was reopened from the saved result")).await?;
        return Ok(Redirect::to(&edit_path));
    };

    match form.get("action").map(String::as_str) {
        Some("discard") => {
            session.remove::<ResultEditor>(session_keys::RESULT_EDITOR).await?;
            return Ok(Redirect::to(BASE_PATH));
        }
        Some("add_subject") => {
            apply_form(&mut editor, &form);
            editor.add_subject();
        }
        _ => {
            apply_form(&mut editor, &form);
            let banner = match editor.update() {
                Err(e) => StatusBanner::error(e.to_string()),
                Ok(body) => match state.backend().update_result(&admin.token.token, &id, &body).await {
                    Ok(()) => {
                        state.collections().results.write().await.upsert(editor.to_record());
                        tracing::info!(result_id = %id, "Result updated");
                        StatusBanner::success("Result updated successfully!")
                    }
                    Err(e) if e.is_unauthorized() => return Err(e.into()),
                    Err(e) => {
                        tracing::error!(result_id = %id, error = %e, "Failed to update result");
                        StatusBanner::error(e.user_message())
                    }
                },
            };
            set_flash(&session, banner).await?;
        }
    }

    save_editor(&session, &editor).await?;
    Ok(Redirect::to(&edit_path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shodhsutra_core::{ResultSheet, StudentResult};

    use super::*;

    fn editor() -> ResultEditor {
        ResultEditor::open(&StudentResult {
            id: ResultId::new("r1"),
            result: ResultSheet {
                name: "Asha".to_string(),
                roll_no: "17".to_string(),
                subjects: vec![SubjectRow {
                    sno: 1,
                    name: "Research Methods".to_string(),
                    full: Some(100),
                    pass: Some(40),
                    obtained: Some(71),
                }],
                ..ResultSheet::default()
            },
        })
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_apply_form_updates_fields_and_totals() {
        let mut editor = editor();
        apply_form(
            &mut editor,
            &form(&[
                ("name", "Asha Rao"),
                ("fatherName", "R. Rao"),
                ("subject_obtained_0", "80"),
                ("action", "save"),
            ]),
        );
        assert_eq!(editor.sheet().name, "Asha Rao");
        assert_eq!(editor.sheet().father_name, "R. Rao");
        assert_eq!(editor.sheet().total_obt, 80);
        assert_eq!(editor.sheet().total_full, 100);
    }

    #[test]
    fn test_blank_mark_clears_value() {
        let mut editor = editor();
        apply_form(&mut editor, &form(&[("subject_full_0", "  ")]));
        assert_eq!(editor.sheet().subjects.first().unwrap().full, None);
        assert_eq!(editor.sheet().total_full, 0);
        assert!(editor.validate().is_err());
    }

    #[test]
    fn test_unknown_and_out_of_range_keys_are_ignored() {
        let mut editor = editor();
        let before = editor.clone();
        apply_form(
            &mut editor,
            &form(&[("subject_name_9", "Ghost"), ("subject_colour_0", "red"), ("subject_name_x", "?")]),
        );
        assert_eq!(editor, before);
    }

    #[test]
    fn test_subject_view_renders_missing_marks_blank() {
        let row = SubjectRow {
            sno: 2,
            name: String::new(),
            full: None,
            pass: Some(0),
            obtained: None,
        };
        let view = SubjectView::new(1, &row);
        assert_eq!(view.full, "");
        assert_eq!(view.pass, "0");
    }
}
