//! Gallery images.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use shodhsutra_core::{ApiToken, GalleryImage, GalleryImageId, PendingFile, UploadRequest};
use tracing::instrument;

use super::{BackendClient, BackendError, parse_upload_body};

/// Multipart field the backend reads the file from.
const IMAGE_FIELD: &str = "image";

impl BackendClient {
    /// Fetch every gallery image.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_gallery(&self, token: &ApiToken) -> Result<Vec<GalleryImage>, BackendError> {
        self.get("/gallery", token).await
    }

    /// Send an upload or replace resolved by the upload slot.
    ///
    /// Returns the stored record when the reply includes one.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token, request), fields(file = %request.file().file_name))]
    pub async fn send_upload(
        &self,
        token: &ApiToken,
        request: &UploadRequest,
    ) -> Result<Option<GalleryImage>, BackendError> {
        match request {
            UploadRequest::Create { file } => self.upload_image(token, file).await,
            UploadRequest::Replace { id, file } => self.replace_image(token, id, file).await,
        }
    }

    /// Upload a new image (`POST /gallery/upload`).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token, file))]
    pub async fn upload_image(
        &self,
        token: &ApiToken,
        file: &PendingFile,
    ) -> Result<Option<GalleryImage>, BackendError> {
        let body = self
            .send_multipart(Method::POST, "/gallery/upload", token, image_form(file)?)
            .await?;
        Ok(parse_upload_body(&body))
    }

    /// Replace the file behind an existing image (`PUT /gallery/:id`).
    ///
    /// # Errors
    ///
    /// Returns error if the image is unknown or the API request fails.
    #[instrument(skip(self, token, file), fields(image_id = %id))]
    pub async fn replace_image(
        &self,
        token: &ApiToken,
        id: &GalleryImageId,
        file: &PendingFile,
    ) -> Result<Option<GalleryImage>, BackendError> {
        let path = format!("/gallery/{}", urlencoding::encode(id.as_str()));
        let body = self.send_multipart(Method::PUT, &path, token, image_form(file)?).await?;
        Ok(parse_upload_body(&body))
    }

    /// Delete one image.
    ///
    /// # Errors
    ///
    /// Returns error if the image is unknown or the API request fails.
    #[instrument(skip(self, token), fields(image_id = %id))]
    pub async fn delete_image(&self, token: &ApiToken, id: &GalleryImageId) -> Result<(), BackendError> {
        let path = format!("/gallery/{}", urlencoding::encode(id.as_str()));
        self.delete(&path, token).await
    }
}

fn image_form(file: &PendingFile) -> Result<Form, BackendError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)?;
    Ok(Form::new().part(IMAGE_FIELD, part))
}
