//! Gallery commands.
//!
//! Uploads go through the same [`UploadSlot`] as the web screen, so the
//! checks and the success/failure wording match.

use std::path::Path;

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use shodhsutra_core::{GalleryImageId, UploadSlot};

use super::{CliError, Console, confirm, load, read_image};

/// List every image with its public URL.
///
/// # Errors
///
/// Returns error if sign-in or the fetch fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CliError> {
    let console = Console::connect().await?;
    let collection = load(|| console.backend().list_gallery(console.token())).await?;

    if collection.is_empty() {
        println!("No images found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Id", "URL"]);
    for image in collection.items() {
        table.add_row(vec![image.id.to_string(), image.src(console.asset_url())]);
    }
    println!("{table}");
    Ok(())
}

/// Upload `path` as a new image, or as the new file behind `target`.
///
/// The file is checked before signing in; a non-image never reaches the
/// backend.
///
/// # Errors
///
/// Returns error if the file is unreadable or not an image, sign-in fails,
/// or the backend refuses the upload.
#[allow(clippy::print_stdout)]
pub async fn upload(target: Option<String>, path: &Path) -> Result<(), CliError> {
    let mut slot = UploadSlot::new();
    if let Some(id) = target {
        slot.prepare_replace(GalleryImageId::new(id));
    }
    slot.select_file(read_image(path)?);
    let request = slot.submit()?;

    let console = Console::connect().await?;
    let result = console.backend().send_upload(console.token(), &request).await;
    slot.complete(result.is_ok());
    if let Some(banner) = slot.banner() {
        println!("{}", banner.message);
    }

    if let Some(record) = result? {
        println!("{}", record.src(console.asset_url()));
    }
    Ok(())
}

/// Delete one image after confirmation.
///
/// # Errors
///
/// Returns error if sign-in fails or the backend refuses the delete.
#[allow(clippy::print_stdout)]
pub async fn delete(id: &str, yes: bool) -> Result<(), CliError> {
    let id = GalleryImageId::new(id);
    if !yes && !confirm("Are you sure you want to delete this image?")? {
        println!("Cancelled");
        return Ok(());
    }

    let console = Console::connect().await?;
    match console.backend().delete_image(console.token(), &id).await {
        Ok(()) => {
            tracing::info!(image_id = %id, "Gallery image deleted");
            println!("Image deleted successfully!");
            Ok(())
        }
        Err(e) => {
            println!("Failed to delete image!");
            Err(e.into())
        }
    }
}
