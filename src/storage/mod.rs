//! # Storage Layer
//!
//! Persistence for a local workitems workspace, using plain files that are
//! easy to inspect and edit by hand.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Working copy | JSON, one file per item | `.workitems/download/{Type}_{id}_{Title}.json` |
//! | Snapshot | Same, copied after every fetch | `.workitems/.snapshot/` |
//! | Config | TOML | `.workitems/config.toml` |
//! | Sync state | JSON | `.workitems/state.json` |
//! | Document | Markdown | `.workitems/Requirements.md` (configurable) |
//!
//! ## Concurrency Safety
//!
//! - Commands that write take an exclusive `fs2` lock on `.workitems/.lock`
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing a workspace
//! - [`RecordStore`] - Read/write work item records as JSON files
//! - [`DocumentFile`] - Write the generated document
//! - [`Config`] - Workspace and global configuration

mod config;
mod document;
mod records;
mod workspace;

pub use config::{
    Config, ConfigError, DocumentConfig, GlobalConfig, OutputFormat, ProjectConfig, RemoteConfig,
};
pub use document::DocumentFile;
pub use records::RecordStore;
pub use workspace::{SyncState, Workspace, WorkspaceError, WorkspaceLock, WORKSPACE_DIR};
