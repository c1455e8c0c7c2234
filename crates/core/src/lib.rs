//! Shodhsutra Core - domain logic for the admin console.
//!
//! This crate is shared by both front ends:
//! - `admin` - Server-rendered web console
//! - `cli` - Command-line console for scripted maintenance
//!
//! # Architecture
//!
//! The core crate holds no I/O: no HTTP clients, no sessions, no terminals.
//! Every operation here is a plain transform of in-memory state, so the
//! admin routes and the CLI commands share one implementation and the
//! behaviour can be unit tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, slugs, data URLs and tokens
//! - [`records`] - Backend records shown in list screens
//! - [`collection`] - Fetched collections with local search and pagination
//! - [`gallery`] - The gallery upload/replace slot
//! - [`editor`] - Rich-text document model, commands and HTML output
//! - [`drafts`] - Blog and case-study drafts
//! - [`results`] - Student result correction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collection;
pub mod drafts;
pub mod editor;
pub mod gallery;
pub mod records;
pub mod results;
pub mod types;

pub use collection::{CollectionPage, LoadState, PAGE_SIZE, Record, RemoteCollection, Searchable, ViewState};
pub use drafts::{BlogSaveResponse, Draft, DraftError, DraftForm, DraftKind, DraftPayload};
pub use gallery::{BannerKind, PendingFile, StatusBanner, UploadError, UploadRequest, UploadSlot};
pub use records::{Appointment, ConsultationRequest, GalleryImage};
pub use results::{
    MarkColumn, ResultEditor, ResultSheet, ResultUpdate, ResultValidationError, SheetField, StudentResult,
    SubjectRow,
};
pub use types::*;
