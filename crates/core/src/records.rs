//! Server-shaped records consumed by the console.
//!
//! These mirror the backend's JSON documents field for field. The console
//! keeps no invariants of its own beyond display formatting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{Record, Searchable};
use crate::types::{AppointmentId, ConsultationId, GalleryImageId};

/// A consultation request submitted through the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    #[serde(rename = "_id")]
    pub id: ConsultationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ConsultationRequest {
    /// Submission date as shown in list views (`YYYY-MM-DD`).
    #[must_use]
    pub fn created_on(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }

    /// The message, or a placeholder when the requester left none.
    #[must_use]
    pub fn message_or_placeholder(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => "No message",
        }
    }
}

impl Record for ConsultationRequest {
    type Id = ConsultationId;

    fn id(&self) -> &ConsultationId {
        &self.id
    }
}

impl Searchable for ConsultationRequest {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.full_name, &self.email, &self.phone]
    }
}

/// An image in the public gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub id: GalleryImageId,
    /// Path relative to the backend's asset host, e.g. `/uploads/a.jpg`.
    pub image_url: String,
}

impl GalleryImage {
    /// Absolute URL of the image given the backend asset host.
    ///
    /// The host and the path are concatenated as-is.
    #[must_use]
    pub fn src(&self, asset_base: &str) -> String {
        format!("{asset_base}{}", self.image_url)
    }
}

impl Record for GalleryImage {
    type Id = GalleryImageId;

    fn id(&self) -> &GalleryImageId {
        &self.id
    }
}

impl Searchable for GalleryImage {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.image_url]
    }
}

/// An appointment request. Read-only in the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: AppointmentId,
    pub name: String,
    pub phone: String,
    pub location: String,
    /// Raw date as stored by the backend (a calendar date or a timestamp).
    pub date: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Appointment {
    /// The appointment date formatted as `YYYY-MM-DD`.
    ///
    /// Falls back to the raw value when it is neither an RFC 3339 timestamp
    /// nor a calendar date.
    #[must_use]
    pub fn date_display(&self) -> String {
        display_date(&self.date)
    }

    /// The message, or an em-width placeholder for empty table cells.
    #[must_use]
    pub fn message_or_dash(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => "—",
        }
    }
}

impl Record for Appointment {
    type Id = AppointmentId;

    fn id(&self) -> &AppointmentId {
        &self.id
    }
}

impl Searchable for Appointment {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.phone, &self.location]
    }
}

fn display_date(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_consultation_from_backend_json() {
        let record: ConsultationRequest = serde_json::from_value(json!({
            "_id": "c1",
            "fullName": "Asha Verma",
            "email": "asha@example.com",
            "phone": "9876543210",
            "message": "Need help with synopsis",
            "createdAt": "2025-02-03T10:15:00.000Z",
            "__v": 0
        }))
        .unwrap();

        assert_eq!(record.id.as_str(), "c1");
        assert_eq!(record.created_on(), "2025-02-03");
        assert_eq!(record.message_or_placeholder(), "Need help with synopsis");
    }

    #[test]
    fn test_consultation_without_message() {
        let record: ConsultationRequest = serde_json::from_value(json!({
            "_id": "c2",
            "fullName": "B",
            "email": "b@example.com",
            "phone": "1",
            "createdAt": "2025-02-03T10:15:00Z"
        }))
        .unwrap();
        assert_eq!(record.message_or_placeholder(), "No message");
    }

    #[test]
    fn test_gallery_src_concatenates() {
        let image = GalleryImage {
            id: GalleryImageId::new("g1"),
            image_url: "/uploads/gallery/a.jpg".to_string(),
        };
        assert_eq!(
            image.src("https://api.shodhsutra.com"),
            "https://api.shodhsutra.com/uploads/gallery/a.jpg"
        );
    }

    #[test]
    fn test_appointment_dates() {
        let mut appt: Appointment = serde_json::from_value(json!({
            "_id": "a1",
            "name": "Ravi",
            "phone": "12345",
            "location": "Delhi",
            "date": "2025-03-14T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(appt.date_display(), "2025-03-14");
        assert_eq!(appt.message_or_dash(), "—");

        appt.date = "2025-04-01".to_string();
        assert_eq!(appt.date_display(), "2025-04-01");

        appt.date = "next week".to_string();
        assert_eq!(appt.date_display(), "next week");
    }
}
