//! Consultation requests.

use shodhsutra_core::{ApiToken, ConsultationId, ConsultationRequest};
use tracing::instrument;

use super::{BackendClient, BackendError, DataEnvelope};

impl BackendClient {
    /// Fetch every consultation request.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_consultations(&self, token: &ApiToken) -> Result<Vec<ConsultationRequest>, BackendError> {
        let response: DataEnvelope<Vec<ConsultationRequest>> = self.get("/consultation", token).await?;
        Ok(response.data)
    }

    /// Delete one consultation request.
    ///
    /// # Errors
    ///
    /// Returns error if the request is unknown or the API request fails.
    #[instrument(skip(self, token), fields(consultation_id = %id))]
    pub async fn delete_consultation(&self, token: &ApiToken, id: &ConsultationId) -> Result<(), BackendError> {
        let path = format!("/consultation/{}", urlencoding::encode(id.as_str()));
        self.delete(&path, token).await
    }
}
