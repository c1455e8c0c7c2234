//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Sign-in by backend token exchange
//! - `collections` - Shared, lazily reloaded resource lists

pub mod auth;
pub mod collections;

pub use auth::{AdminAuthError, AdminAuthService};
pub use collections::{Collections, ReloadPolicy, SharedCollection, ensure_fresh, load_for_view};
