//! Appointment requests (read-only).

use shodhsutra_core::{ApiToken, Appointment};
use tracing::instrument;

use super::{AppointmentsEnvelope, BackendClient, BackendError};

impl BackendClient {
    /// Fetch every appointment. A reply without an `appointments` key is an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_appointments(&self, token: &ApiToken) -> Result<Vec<Appointment>, BackendError> {
        let response: AppointmentsEnvelope = self.get("/appointments/admin/all", token).await?;
        Ok(response.appointments)
    }
}
