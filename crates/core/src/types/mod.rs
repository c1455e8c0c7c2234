//! Core value types for the admin console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod data_url;
pub mod email;
pub mod id;
pub mod slug;

pub use credential::{ApiToken, IssuedToken};
pub use data_url::{DataUrl, DataUrlError};
pub use email::{Email, EmailError};
pub use id::*;
pub use slug::{Slug, SlugError};
