//! Domain models for work items
//!
//! Contains the core logic without any I/O concerns.

mod id;
mod work_item;
mod changes;
mod hierarchy;

pub use id::{IdError, WorkItemId};
pub use work_item::{field, Fields, TrackedField, WorkItem, WorkItemRecord};
pub use changes::{detect_changes, ChangeRecord};
pub use hierarchy::{type_priority, Detached, Hierarchy, UNRANKED_TYPE};
