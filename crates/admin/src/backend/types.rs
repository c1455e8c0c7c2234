//! Backend wire types.
//!
//! Record shapes live in `shodhsutra-core`; these are the envelopes around
//! them and the request bodies the gateway sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shodhsutra_core::{Appointment, GalleryImage};

/// `{ "data": ... }` envelope used by consultations and results.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Reply to `GET /appointments/admin/all`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentsEnvelope {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

/// A body that may carry a human-readable message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Reply to `POST /auth/login`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Reply to an upload or replace.
///
/// The backend has answered with the bare record, the record under `image`
/// or `data`, or just a message, depending on version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Record(GalleryImage),
    Image { image: GalleryImage },
    Data { data: GalleryImage },
    Other(serde_json::Value),
}

impl UploadResponse {
    /// The record the reply carries, if any.
    #[must_use]
    pub fn into_record(self) -> Option<GalleryImage> {
        match self {
            Self::Record(image) | Self::Image { image } | Self::Data { data: image } => Some(image),
            Self::Other(_) => None,
        }
    }
}

/// Interpret the body of a successful upload or replace.
///
/// An empty or non-JSON body is treated as "no record".
#[must_use]
pub fn parse_upload_body(body: &str) -> Option<GalleryImage> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<UploadResponse>(body) {
        Ok(response) => response.into_record(),
        Err(e) => {
            tracing::warn!(error = %e, "Upload reply was not JSON");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_reply_shapes() {
        let bare = parse_upload_body(r#"{"_id":"g1","imageUrl":"/uploads/a.jpg"}"#).unwrap();
        assert_eq!(bare.id.as_str(), "g1");

        let nested = parse_upload_body(r#"{"message":"ok","image":{"_id":"g2","imageUrl":"/uploads/b.jpg"}}"#)
            .unwrap();
        assert_eq!(nested.image_url, "/uploads/b.jpg");

        let data = parse_upload_body(r#"{"data":{"_id":"g3","imageUrl":"/uploads/c.jpg"}}"#).unwrap();
        assert_eq!(data.id.as_str(), "g3");

        assert!(parse_upload_body(r#"{"message":"Image uploaded"}"#).is_none());
        assert!(parse_upload_body("").is_none());
        assert!(parse_upload_body("Created").is_none());
    }

    #[test]
    fn test_appointments_missing_key_is_empty() {
        let envelope: AppointmentsEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.appointments.is_empty());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "admin@shodhsutra.com",
            password: "hunter2",
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
