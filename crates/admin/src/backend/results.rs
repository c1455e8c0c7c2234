//! Student results.

use reqwest::Method;
use shodhsutra_core::{ApiToken, ResultId, ResultUpdate, StudentResult};
use tracing::instrument;

use super::{BackendClient, BackendError, DataEnvelope};

impl BackendClient {
    /// Fetch every published result.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_results(&self, token: &ApiToken) -> Result<Vec<StudentResult>, BackendError> {
        let response: DataEnvelope<Vec<StudentResult>> = self.get("/results", token).await?;
        Ok(response.data)
    }

    /// Fetch one result.
    ///
    /// # Errors
    ///
    /// Returns error if the result is unknown or the API request fails.
    #[instrument(skip(self, token), fields(result_id = %id))]
    pub async fn get_result(&self, token: &ApiToken, id: &ResultId) -> Result<StudentResult, BackendError> {
        let path = format!("/results/{}", urlencoding::encode(id.as_str()));
        let response: DataEnvelope<StudentResult> = self.get(&path, token).await?;
        Ok(response.data)
    }

    /// Save a corrected result sheet.
    ///
    /// # Errors
    ///
    /// Returns error if the backend does not accept the update.
    #[instrument(skip(self, token, update), fields(result_id = %id))]
    pub async fn update_result(
        &self,
        token: &ApiToken,
        id: &ResultId,
        update: &ResultUpdate<'_>,
    ) -> Result<(), BackendError> {
        let path = format!("/results/{}", urlencoding::encode(id.as_str()));
        self.send_json_unit(Method::PUT, &path, token, update).await
    }
}
