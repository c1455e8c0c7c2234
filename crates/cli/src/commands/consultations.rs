//! Consultation request commands.

use shodhsutra_core::{ConsultationId, ViewState};

use super::{CliError, Console, confirm, load, print_page};

/// List one page of consultation requests.
///
/// # Errors
///
/// Returns error if sign-in or the fetch fails.
pub async fn list(search: &str, page: usize) -> Result<(), CliError> {
    let console = Console::connect().await?;
    let collection = load(|| console.backend().list_consultations(console.token())).await?;

    let mut view = ViewState::new();
    view.set_search_term(search);
    view.set_page(page);

    print_page(
        &collection.view(&view),
        &["Name", "Email", "Phone", "Date", "Id"],
        |c| {
            vec![
                c.full_name.clone(),
                c.email.clone(),
                c.phone.clone(),
                c.created_on(),
                c.id.to_string(),
            ]
        },
    );
    Ok(())
}

/// Delete one consultation request after confirmation.
///
/// # Errors
///
/// Returns error if sign-in fails or the backend refuses the delete.
#[allow(clippy::print_stdout)]
pub async fn delete(id: &str, yes: bool) -> Result<(), CliError> {
    let id = ConsultationId::new(id);
    let console = Console::connect().await?;

    if !yes {
        let collection = load(|| console.backend().list_consultations(console.token())).await?;
        let question = collection.find(&id).map_or_else(
            || "Are you sure you want to delete this record?".to_string(),
            |c| format!("Delete the consultation request from {}?", c.full_name),
        );
        if !confirm(&question)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    console.backend().delete_consultation(console.token(), &id).await?;
    tracing::info!(consultation_id = %id, "Consultation deleted");
    println!("Consultation deleted");
    Ok(())
}
