//! Reusable view components for admin templates.

pub mod list;

pub use list::{BannerView, ListQuery, PageLink, PagerView, list_query, page_href};
