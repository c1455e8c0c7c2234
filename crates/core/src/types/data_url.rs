//! Embedded `data:` URLs for uploaded images.

use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`DataUrl`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUrlError {
    /// The uploaded file had no bytes.
    #[error("file is empty")]
    Empty,
    /// The MIME type is not an image type.
    #[error("expected an image file, got '{0}'")]
    NotAnImage(String),
}

/// An image encoded inline as `data:<mime>;base64,<payload>`.
///
/// Featured images and images inserted into a document body travel to the
/// backend in this form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    /// Encode raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is empty or `mime` is not `image/*`.
    pub fn from_image(mime: &str, bytes: &[u8]) -> Result<Self, DataUrlError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") || mime.len() == "image/".len() {
            return Err(DataUrlError::NotAnImage(mime));
        }
        if bytes.is_empty() {
            return Err(DataUrlError::Empty);
        }

        Ok(Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes))))
    }

    /// Returns the MIME type embedded in the URL.
    #[must_use]
    pub fn mime(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or("")
    }

    /// Returns the full URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the URL and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_png() {
        let url = DataUrl::from_image("image/png", b"\x89PNG").unwrap();
        assert_eq!(url.as_str(), "data:image/png;base64,iVBORw==");
        assert_eq!(url.mime(), "image/png");
    }

    #[test]
    fn test_rejects_non_image() {
        assert_eq!(
            DataUrl::from_image("application/pdf", b"%PDF"),
            Err(DataUrlError::NotAnImage("application/pdf".to_string()))
        );
        assert!(DataUrl::from_image("image/", b"x").is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(DataUrl::from_image("image/jpeg", b""), Err(DataUrlError::Empty));
    }
}
