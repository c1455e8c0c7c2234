//! Appointment commands.

use shodhsutra_core::ViewState;

use super::{CliError, Console, load, print_page};

/// List one page of appointment requests.
///
/// # Errors
///
/// Returns error if sign-in or the fetch fails.
pub async fn list(search: &str, page: usize) -> Result<(), CliError> {
    let console = Console::connect().await?;
    let collection = load(|| console.backend().list_appointments(console.token())).await?;

    let mut view = ViewState::new();
    view.set_search_term(search);
    view.set_page(page);

    print_page(
        &collection.view(&view),
        &["Name", "Phone", "Location", "Date", "Message"],
        |a| {
            vec![
                a.name.clone(),
                a.phone.clone(),
                a.location.clone(),
                a.date_display(),
                a.message_or_dash().to_string(),
            ]
        },
    );
    Ok(())
}
