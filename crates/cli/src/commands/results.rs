//! Student result commands.

use shodhsutra_core::ViewState;

use super::{CliError, Console, load, print_page};

/// List one page of student results.
///
/// # Errors
///
/// Returns error if sign-in or the fetch fails.
pub async fn list(search: &str, page: usize) -> Result<(), CliError> {
    let console = Console::connect().await?;
    let collection = load(|| console.backend().list_results(console.token())).await?;

    let mut view = ViewState::new();
    view.set_search_term(search);
    view.set_page(page);

    print_page(
        &collection.view(&view),
        &["Name", "Roll No", "Enrollment No", "Course", "Status", "Id"],
        |r| {
            vec![
                r.result.name.clone(),
                r.result.roll_no.clone(),
                r.result.enrollment_no.clone(),
                r.result.course.clone(),
                r.result.status.clone(),
                r.id.to_string(),
            ]
        },
    );
    Ok(())
}
