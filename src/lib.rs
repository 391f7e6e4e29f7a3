//! workitem-docs - Work item sync and requirements document generator
//!
//! Pulls work items from an Azure DevOps project into a local workspace,
//! detects fields edited locally and pushes them back, and renders the
//! parent/child hierarchy into a single markdown requirements document.

pub mod cli;
pub mod docs;
pub mod domain;
pub mod remote;
pub mod storage;

pub use domain::{ChangeRecord, Hierarchy, TrackedField, WorkItem, WorkItemId, WorkItemRecord};
