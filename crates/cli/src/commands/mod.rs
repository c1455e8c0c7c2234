//! CLI command implementations.
//!
//! Every command that touches the backend first signs in with
//! `SHODHSUTRA_EMAIL` / `SHODHSUTRA_PASSWORD`, then works through the same
//! gateway and core types as the web console.

pub mod appointments;
pub mod consultations;
pub mod drafts;
pub mod gallery;
pub mod results;

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::Path;

use chrono::Utc;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use secrecy::SecretString;
use shodhsutra_admin::backend::{BackendClient, BackendError};
use shodhsutra_admin::config::{BackendConfig, ConfigError};
use shodhsutra_admin::models::CurrentAdmin;
use shodhsutra_admin::services::{AdminAuthError, AdminAuthService};
use shodhsutra_core::editor::EditorError;
use shodhsutra_core::{
    ApiToken, CollectionPage, DataUrlError, DraftError, PendingFile, Record, RemoteCollection, UploadError,
};
use thiserror::Error;

const EMAIL_VAR: &str = "SHODHSUTRA_EMAIL";
const PASSWORD_VAR: &str = "SHODHSUTRA_PASSWORD";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Sign-in failed: {0}")]
    Auth(#[from] AdminAuthError),

    #[error("{}", .0.user_message())]
    Backend(#[from] BackendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Image(#[from] DataUrlError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// A signed-in connection to the backend.
pub struct Console {
    backend: BackendClient,
    admin: CurrentAdmin,
    asset_url: String,
}

impl Console {
    /// Sign in with the credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are missing or refused, or the
    /// backend settings are invalid.
    pub async fn connect() -> Result<Self, CliError> {
        let _ = dotenvy::dotenv();

        let config = BackendConfig::from_env()?;
        let email = std::env::var(EMAIL_VAR).map_err(|_| CliError::MissingEnvVar(EMAIL_VAR))?;
        let password = std::env::var(PASSWORD_VAR)
            .map(SecretString::from)
            .map_err(|_| CliError::MissingEnvVar(PASSWORD_VAR))?;

        let backend = BackendClient::new(&config)?;
        let admin = AdminAuthService::new(&backend).login(&email, &password).await?;
        tracing::info!(email = %admin.email, backend = %backend.base_url(), "Signed in");

        Ok(Self {
            backend,
            admin,
            asset_url: config.asset_url,
        })
    }

    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub const fn token(&self) -> &ApiToken {
        &self.admin.token.token
    }

    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }
}

/// Fetch a whole collection once.
///
/// # Errors
///
/// Returns the fetch error; a CLI has no stale copy to fall back to.
pub async fn load<T, F, Fut>(fetch: F) -> Result<RemoteCollection<T>, CliError>
where
    T: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BackendError>>,
{
    let mut collection = RemoteCollection::new();
    collection.begin_load();
    collection.finish_load(fetch().await, Utc::now())?;
    Ok(collection)
}

/// Render one page of a collection as a table with a leading `#` column.
pub fn page_table<T>(page: &CollectionPage<'_, T>, headers: &[&str], row: impl Fn(&T) -> Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(std::iter::once("#").chain(headers.iter().copied()).collect::<Vec<_>>());

    for (i, record) in page.items().iter().enumerate() {
        let mut cells = vec![(page.first_position().saturating_add(i)).to_string()];
        cells.extend(row(record));
        table.add_row(cells);
    }
    table
}

/// Footer under a list: which page of how many, and the match count.
#[must_use]
pub fn page_footer<T>(page: &CollectionPage<'_, T>) -> String {
    if page.items().is_empty() {
        return "No data found".to_string();
    }
    format!(
        "Page {} of {} ({} of {} records match)",
        page.page(),
        page.page_count(),
        page.filtered_len(),
        page.total()
    )
}

/// Print a list page with its footer.
#[allow(clippy::print_stdout)]
pub fn print_page<T>(page: &CollectionPage<'_, T>, headers: &[&str], row: impl Fn(&T) -> Vec<String>) {
    if !page.items().is_empty() {
        println!("{}", page_table(page, headers, row));
    }
    println!("{}", page_footer(page));
}

/// Ask a yes/no question on the terminal. Anything but `y`/`yes` is no.
///
/// # Errors
///
/// Returns error if the terminal cannot be read or written.
#[allow(clippy::print_stdout)]
pub fn confirm(question: &str) -> Result<bool, CliError> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Read an image file from disk.
///
/// The content type comes from the extension; unknown extensions are sent
/// as `application/octet-stream` and rejected by the upload checks.
///
/// # Errors
///
/// Returns error if the file cannot be read.
pub fn read_image(path: &Path) -> Result<PendingFile, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());

    Ok(PendingFile {
        content_type: content_type_for(path).to_string(),
        file_name,
        bytes,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
