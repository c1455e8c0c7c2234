//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state and per-admin
//! screen state.

use serde::{Deserialize, Serialize};
use shodhsutra_core::{Email, IssuedToken, StatusBanner};
use tower_sessions::Session;

/// Session-stored admin identity.
///
/// The console keeps no user table. The backend-issued token is the whole
/// credential; it is sent as a bearer token on every backend call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Email the admin signed in with.
    pub email: Email,
    /// Backend token and its expiry.
    pub token: IssuedToken,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the one-shot notification shown on the next page.
    pub const FLASH: &str = "flash";

    /// Key for the gallery upload slot (replace target and banner).
    pub const GALLERY_SLOT: &str = "gallery_slot";

    /// Key for the blog draft.
    pub const BLOG_DRAFT: &str = "blog_draft";

    /// Key for the case-study draft.
    pub const CASE_STUDY_DRAFT: &str = "case_study_draft";

    /// Key for the result under correction.
    pub const RESULT_EDITOR: &str = "result_editor";
}

/// Queue a notification for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, banner: StatusBanner) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, banner).await
}

/// Take the pending notification, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<StatusBanner>, tower_sessions::session::Error> {
    session.remove(keys::FLASH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_flash(&session, StatusBanner::success("Saved")).await.unwrap();

        let first = take_flash(&session).await.unwrap();
        assert_eq!(first, Some(StatusBanner::success("Saved")));
        assert_eq!(take_flash(&session).await.unwrap(), None);
    }
}
