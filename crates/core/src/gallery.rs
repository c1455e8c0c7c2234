//! Gallery upload and replace flow.
//!
//! The gallery screen has one upload slot. It either creates a new image or,
//! after [`UploadSlot::prepare_replace`], replaces an existing one. The slot
//! decides which backend call to make and which banner to show; the caller
//! performs the call and reports back through [`UploadSlot::complete`].

use serde::{Deserialize, Serialize};

use crate::types::GalleryImageId;

/// Kind of a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
    Info,
}

impl BannerKind {
    /// CSS modifier used by templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A dismissible message shown above the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBanner {
    pub kind: BannerKind,
    pub message: String,
}

impl StatusBanner {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
        }
    }
}

/// A file chosen for upload but not yet sent.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Errors raised before any network call is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please select an image")]
    NoFile,
    #[error("'{0}' is not an image")]
    NotAnImage(String),
}

/// The backend call a submission resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRequest {
    /// `POST /gallery/upload`
    Create { file: PendingFile },
    /// `PUT /gallery/:id`
    Replace { id: GalleryImageId, file: PendingFile },
}

impl UploadRequest {
    #[must_use]
    pub const fn file(&self) -> &PendingFile {
        match self {
            Self::Create { file } | Self::Replace { file, .. } => file,
        }
    }
}

/// The gallery's single upload slot.
///
/// Only the replace target and the banner survive between requests; the
/// pending file is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSlot {
    target: Option<GalleryImageId>,
    #[serde(skip)]
    file: Option<PendingFile>,
    banner: Option<StatusBanner>,
}

impl UploadSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the file to upload. An existing replace target is kept.
    pub fn select_file(&mut self, file: PendingFile) {
        self.file = Some(file);
    }

    /// Switch the slot into replace mode for `id`.
    pub fn prepare_replace(&mut self, id: GalleryImageId) {
        self.target = Some(id);
        self.file = None;
        self.banner = Some(StatusBanner::info("Select a new file to replace the image"));
    }

    /// Leave replace mode.
    pub fn cancel_replace(&mut self) {
        self.target = None;
        self.file = None;
        self.banner = None;
    }

    /// Hide the current banner.
    pub fn dismiss(&mut self) {
        self.banner = None;
    }

    /// Resolve the slot into a backend request.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoFile`] when no file is selected and
    /// [`UploadError::NotAnImage`] for a non-image content type. In both cases
    /// an error banner is set and nothing should be sent.
    pub fn submit(&mut self) -> Result<UploadRequest, UploadError> {
        let result = match &self.file {
            None => Err(UploadError::NoFile),
            Some(file) if !file.content_type.starts_with("image/") => {
                Err(UploadError::NotAnImage(file.file_name.clone()))
            }
            Some(file) => Ok(match &self.target {
                Some(id) => UploadRequest::Replace {
                    id: id.clone(),
                    file: file.clone(),
                },
                None => UploadRequest::Create { file: file.clone() },
            }),
        };

        if let Err(err) = &result {
            self.banner = Some(StatusBanner::error(err.to_string()));
        }
        result
    }

    /// Record the outcome of the request returned by [`Self::submit`].
    pub fn complete(&mut self, succeeded: bool) {
        let replacing = self.target.is_some();
        self.banner = Some(match (succeeded, replacing) {
            (true, false) => StatusBanner::success("Image uploaded successfully!"),
            (true, true) => StatusBanner::success("Image updated successfully!"),
            (false, false) => StatusBanner::error("Image upload failed!"),
            (false, true) => StatusBanner::error("Image update failed!"),
        });
        if succeeded {
            self.file = None;
            self.target = None;
        }
    }

    /// Show an arbitrary banner, e.g. after a failed list load.
    pub fn set_banner(&mut self, banner: StatusBanner) {
        self.banner = Some(banner);
    }

    #[must_use]
    pub const fn target(&self) -> Option<&GalleryImageId> {
        self.target.as_ref()
    }

    #[must_use]
    pub const fn file(&self) -> Option<&PendingFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub const fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref()
    }
}
