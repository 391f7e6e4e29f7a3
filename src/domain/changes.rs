//! Change detection between the working copy and the last snapshot
//!
//! Only [`TrackedField`]s are compared. An item missing from the snapshot is
//! reported with every tracked field. Items that exist only in the snapshot
//! produce nothing: deletions are not surfaced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::id::WorkItemId;
use super::work_item::{TrackedField, WorkItemRecord};

/// Field-level changes for a single work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// The changed work item
    pub id: WorkItemId,

    /// Current value of each changed field; `None` means the field was cleared
    pub changed_fields: BTreeMap<TrackedField, Option<Value>>,
}

impl ChangeRecord {
    /// Returns true if the record carries no changes
    pub fn is_empty(&self) -> bool {
        self.changed_fields.is_empty()
    }

    /// Returns the number of changed fields
    pub fn len(&self) -> usize {
        self.changed_fields.len()
    }
}

/// Collects the tracked field values of a record
fn tracked_values(record: &WorkItemRecord) -> BTreeMap<TrackedField, Option<Value>> {
    TrackedField::ALL
        .iter()
        .map(|field| (*field, record.tracked_value(*field).cloned()))
        .collect()
}

/// Compares current records against a snapshot
///
/// Output order follows the iteration order of `current`.
pub fn detect_changes<'a>(
    current: impl IntoIterator<Item = &'a WorkItemRecord>,
    snapshot: &HashMap<WorkItemId, WorkItemRecord>,
) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for record in current {
        let Some(previous) = snapshot.get(&record.id) else {
            changes.push(ChangeRecord {
                id: record.id,
                changed_fields: tracked_values(record),
            });
            continue;
        };

        let changed_fields: BTreeMap<_, _> = TrackedField::ALL
            .iter()
            .filter_map(|field| {
                let now = record.tracked_value(*field);
                let before = previous.tracked_value(*field);
                (now != before).then(|| (*field, now.cloned()))
            })
            .collect();

        if !changed_fields.is_empty() {
            changes.push(ChangeRecord {
                id: record.id,
                changed_fields,
            });
        }
    }

    changes
}
