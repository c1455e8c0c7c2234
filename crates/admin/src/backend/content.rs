//! Blog posts and case studies.

use reqwest::Method;
use shodhsutra_core::{ApiToken, BlogSaveResponse, DraftKind, DraftPayload};
use tracing::instrument;

use super::{BackendClient, BackendError};

impl BackendClient {
    /// Create a blog post or case study from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` when the backend answers a blog
    /// create with `success: false`, or any transport/status error.
    #[instrument(skip(self, token, payload), fields(kind = ?kind, slug = %payload.slug))]
    pub async fn create_content(
        &self,
        token: &ApiToken,
        kind: DraftKind,
        payload: &DraftPayload,
    ) -> Result<(), BackendError> {
        match kind {
            DraftKind::Blog => {
                let response: BlogSaveResponse = self
                    .send_json(Method::POST, kind.endpoint(), Some(token), payload)
                    .await?;
                response.into_result().map_err(BackendError::Rejected)
            }
            DraftKind::CaseStudy => {
                self.send_json_unit(Method::POST, kind.endpoint(), token, payload)
                    .await
            }
        }
    }
}
