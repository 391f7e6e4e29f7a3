//! # Document Generation
//!
//! Turns a work item hierarchy into a single markdown requirements document.
//!
//! ## Pipeline
//!
//! ```text
//! records ──► Hierarchy::build ──► render_document ──► text
//!                                       │
//!                                       └── strip_html / format_section per item
//! ```
//!
//! Everything here is pure: no I/O, no errors. Writing the result is up to
//! [`crate::storage::DocumentFile`].

mod clean;
mod render;

pub use clean::{format_section, normalize_headings, strip_html};
pub use render::{format_criteria, render_document, render_item, DocumentHeader};
