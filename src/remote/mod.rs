//! # Remote Item Source
//!
//! Access to the tracker that owns the work items.
//!
//! ## Overview
//!
//! Everything that talks to the network sits behind [`ItemSource`], so the
//! sync pipeline can run against the real tracker or an in-memory fake.
//!
//! ## Protocol
//!
//! ```text
//! CLI                           Azure DevOps REST API
//!  │                                   │
//!  ├── POST _apis/wit/wiql ───────────►│  list IDs
//!  ├── GET  _apis/wit/workitems/{id} ─►│  full record ($expand=all)
//!  └── PATCH _apis/wit/workitems/{id} ►│  JSON-patch of changed fields
//! ```
//!
//! ## Key Types
//!
//! - [`ItemSource`] - Trait for listing, fetching and updating items
//! - [`AdoClient`] - HTTP implementation for Azure DevOps
//! - [`pull`] / [`push`] - Sync between the source and a workspace

mod ado;
mod protocol;
mod sync;

use thiserror::Error;

use crate::domain::{ChangeRecord, WorkItemId, WorkItemRecord};

pub use ado::AdoClient;
pub use protocol::{
    patch_document, PatchOp, PatchOperation, WiqlReference, WiqlRequest, WiqlResponse,
};
pub use sync::{
    pending_changes, pull, pull_keeping, push, PullReport, PushFailure, PushReport,
};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("No access token: set {0} or `pat` in the global config")]
    MissingToken(String),

    #[error("{what} failed with HTTP {status}: {body}")]
    Status {
        what: String,
        status: u16,
        body: String,
    },

    #[error("{what} failed: {source}")]
    Transport {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response for {what}: {message}")]
    InvalidResponse { what: String, message: String },
}

/// A tracker that work items can be read from and written back to
pub trait ItemSource {
    /// Lists the IDs of every work item, ordered by ID
    fn list_ids(&self) -> Result<Vec<WorkItemId>, RemoteError>;

    /// Fetches one full record
    fn fetch(&self, id: WorkItemId) -> Result<WorkItemRecord, RemoteError>;

    /// Writes the changed fields of one item back to the tracker
    fn apply_update(&self, change: &ChangeRecord) -> Result<(), RemoteError>;
}
