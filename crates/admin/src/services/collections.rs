//! Shared collection caches.
//!
//! Each resource list is fetched whole and kept in one
//! [`RemoteCollection`] shared by every request. Search, pagination and
//! selection are per request and never touch the shared copy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shodhsutra_core::{Appointment, ConsultationRequest, GalleryImage, Record, RemoteCollection, StudentResult};
use tokio::sync::RwLock;

use crate::backend::BackendError;
use crate::error::AppError;

/// A collection shared between requests.
pub type SharedCollection<T> = Arc<RwLock<RemoteCollection<T>>>;

/// Every cached resource list.
#[derive(Clone, Default)]
pub struct Collections {
    pub consultations: SharedCollection<ConsultationRequest>,
    pub appointments: SharedCollection<Appointment>,
    pub gallery: SharedCollection<GalleryImage>,
    pub results: SharedCollection<StudentResult>,
}

/// When a list view may reuse its cached copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    /// Reload even if the copy is fresh.
    pub force: bool,
    /// Age after which the copy is reloaded.
    pub max_age: Duration,
}

/// Reload `cache` with `fetch` if the policy asks for it.
///
/// The write lock is held across the fetch, so concurrent viewers wait for
/// one load instead of issuing their own.
///
/// # Errors
///
/// Returns the fetch error. The cached items are kept in that case.
pub async fn ensure_fresh<T, F, Fut>(
    cache: &SharedCollection<T>,
    policy: ReloadPolicy,
    fetch: F,
) -> Result<(), BackendError>
where
    T: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BackendError>>,
{
    let max_age = chrono::Duration::from_std(policy.max_age).unwrap_or(chrono::Duration::MAX);

    if !policy.force && !cache.read().await.needs_reload(Utc::now(), max_age) {
        return Ok(());
    }

    let mut guard = cache.write().await;
    if !policy.force && !guard.needs_reload(Utc::now(), max_age) {
        return Ok(());
    }

    guard.begin_load();
    let result = fetch().await;
    guard.finish_load(result, Utc::now())
}

/// [`ensure_fresh`] for list screens.
///
/// A failed load is logged and the screen renders whatever is cached.
/// Returns whether the copy is current. A rejected token is the exception:
/// it is returned so the admin is sent back to the login page.
///
/// # Errors
///
/// Returns `AppError::Backend` only for `BackendError::Unauthorized`.
pub async fn load_for_view<T, F, Fut>(
    resource: &'static str,
    cache: &SharedCollection<T>,
    policy: ReloadPolicy,
    fetch: F,
) -> Result<bool, AppError>
where
    T: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BackendError>>,
{
    match ensure_fresh(cache, policy, fetch).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(resource, error = %e, "Failed to load collection");
            Ok(false)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use shodhsutra_core::GalleryImageId;

    use super::*;

    fn image(id: &str) -> GalleryImage {
        GalleryImage {
            id: GalleryImageId::new(id),
            image_url: format!("/uploads/{id}.jpg"),
        }
    }

    const FRESH: ReloadPolicy = ReloadPolicy {
        force: false,
        max_age: Duration::from_secs(300),
    };

    #[tokio::test]
    async fn test_fresh_copy_is_reused() {
        let cache: SharedCollection<GalleryImage> = SharedCollection::default();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![image("a")])
        };

        ensure_fresh(&cache, FRESH, fetch).await.unwrap();
        ensure_fresh(&cache, FRESH, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let forced = ReloadPolicy { force: true, ..FRESH };
        ensure_fresh(&cache, forced, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_max_age_always_reloads() {
        let cache: SharedCollection<GalleryImage> = SharedCollection::default();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let policy = ReloadPolicy {
            force: false,
            max_age: Duration::ZERO,
        };
        for _ in 0..3 {
            ensure_fresh(&cache, policy, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            })
            .await
            .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_items_and_is_swallowed() {
        let cache: SharedCollection<GalleryImage> = SharedCollection::default();
        ensure_fresh(&cache, FRESH, || async { Ok(vec![image("a"), image("b")]) })
            .await
            .unwrap();

        let forced = ReloadPolicy { force: true, ..FRESH };
        let loaded = load_for_view("gallery", &cache, forced, || async {
            Err(BackendError::Api {
                status: 500,
                message: "down".into(),
            })
        })
        .await
        .unwrap();

        assert!(!loaded);
        let guard = cache.read().await;
        assert_eq!(guard.len(), 2);
        assert!(!guard.is_loading());
    }

    #[tokio::test]
    async fn test_unauthorized_load_is_returned() {
        let cache: SharedCollection<GalleryImage> = SharedCollection::default();
        let result = load_for_view("gallery", &cache, FRESH, || async { Err(BackendError::Unauthorized) }).await;
        assert!(matches!(result, Err(AppError::Backend(BackendError::Unauthorized))));
    }
}
