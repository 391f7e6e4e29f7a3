//! Work item domain model
//!
//! A [`WorkItemRecord`] is the full record exactly as the remote tracker
//! delivers it: an ID, a revision, and an open `fields` map keyed by field
//! reference name. Records are what gets persisted and diffed.
//!
//! A [`WorkItem`] is the typed, read-only view used for building the
//! hierarchy and rendering documents. Missing text fields become empty
//! strings so a malformed record still renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::id::WorkItemId;

/// Field reference names used by the remote tracker
pub mod field {
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const TITLE: &str = "System.Title";
    pub const DESCRIPTION: &str = "System.Description";
    pub const ACCEPTANCE_CRITERIA: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";
    pub const STATE: &str = "System.State";
    pub const PRIORITY: &str = "Microsoft.VSTS.Common.Priority";
    pub const PARENT: &str = "System.Parent";
}

/// Fields monitored for local edits
///
/// Declaration order is the order fields appear in change listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Title,
    Description,
    AcceptanceCriteria,
    State,
    Priority,
}

impl TrackedField {
    /// All tracked fields in listing order
    pub const ALL: [TrackedField; 5] = [
        TrackedField::Title,
        TrackedField::Description,
        TrackedField::AcceptanceCriteria,
        TrackedField::State,
        TrackedField::Priority,
    ];

    /// Returns the remote reference name for this field
    pub fn reference_name(&self) -> &'static str {
        match self {
            TrackedField::Title => field::TITLE,
            TrackedField::Description => field::DESCRIPTION,
            TrackedField::AcceptanceCriteria => field::ACCEPTANCE_CRITERIA,
            TrackedField::State => field::STATE,
            TrackedField::Priority => field::PRIORITY,
        }
    }

    /// Returns a short display label
    pub fn label(&self) -> &'static str {
        match self {
            TrackedField::Title => "title",
            TrackedField::Description => "description",
            TrackedField::AcceptanceCriteria => "acceptance_criteria",
            TrackedField::State => "state",
            TrackedField::Priority => "priority",
        }
    }
}

/// Open field map of a record, keyed by reference name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Gets a field value; explicit `null` reads as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Gets a field value as a string slice
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Gets a field value as a work item reference
    ///
    /// The tracker sends numbers, but hand-edited records may carry strings.
    pub fn get_id(&self, key: &str) -> Option<WorkItemId> {
        match self.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .map(WorkItemId::new),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Sets a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a field value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// A work item record as stored on disk and exchanged with the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemRecord {
    /// Unique identifier
    pub id: WorkItemId,

    /// Remote revision number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<u64>,

    /// Field values keyed by reference name
    #[serde(default)]
    pub fields: Fields,

    /// Any other top-level keys (links, relations, urls), kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl WorkItemRecord {
    /// Creates an empty record with the given ID
    pub fn new(id: WorkItemId) -> Self {
        Self {
            id,
            rev: None,
            fields: Fields::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.set(key, value);
        self
    }

    /// Returns the value of a tracked field
    pub fn tracked_value(&self, tracked: TrackedField) -> Option<&Value> {
        self.fields.get(tracked.reference_name())
    }

    /// Returns the work item type, or an empty string
    pub fn item_type(&self) -> &str {
        self.fields.get_str(field::WORK_ITEM_TYPE).unwrap_or_default()
    }

    /// Returns the title, or an empty string
    pub fn title(&self) -> &str {
        self.fields.get_str(field::TITLE).unwrap_or_default()
    }

    /// Returns the declared parent reference
    pub fn parent_id(&self) -> Option<WorkItemId> {
        self.fields.get_id(field::PARENT)
    }

    /// Returns the file name this record is stored under
    ///
    /// Format: `{Type}_{id}_{Title}.json` where the title keeps only
    /// alphanumerics, spaces, `-` and `_`, and is capped at 50 characters.
    pub fn file_name(&self) -> String {
        let item_type = self.item_type().replace(' ', "_");

        let title: String = self
            .title()
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect();
        let title: String = title.trim().replace(' ', "_").chars().take(50).collect();

        format!("{}_{}_{}.json", item_type, self.id, title)
    }

    /// Builds the typed view used for hierarchy and rendering
    pub fn to_work_item(&self) -> WorkItem {
        WorkItem {
            id: self.id,
            item_type: self.item_type().to_string(),
            title: self.title().to_string(),
            description: self
                .fields
                .get_str(field::DESCRIPTION)
                .unwrap_or_default()
                .to_string(),
            acceptance_criteria: self
                .fields
                .get_str(field::ACCEPTANCE_CRITERIA)
                .unwrap_or_default()
                .to_string(),
            parent_id: self.parent_id(),
        }
    }
}

/// Typed view of a work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier
    pub id: WorkItemId,

    /// Category label (e.g. "Feature", "User Story", "Task")
    #[serde(rename = "type")]
    pub item_type: String,

    /// Short display string
    pub title: String,

    /// Rich-text description (may contain markup)
    #[serde(default)]
    pub description: String,

    /// Rich-text acceptance criteria, scenarios separated by blank lines
    #[serde(default)]
    pub acceptance_criteria: String,

    /// Declared parent; `None` means the item is a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<WorkItemId>,
}

impl WorkItem {
    /// Creates a work item with no content and no parent
    pub fn new(
        id: impl Into<WorkItemId>,
        item_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            title: title.into(),
            description: String::new(),
            acceptance_criteria: String::new(),
            parent_id: None,
        }
    }

    /// Builder-style parent setter
    pub fn with_parent(mut self, parent: impl Into<WorkItemId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> WorkItemRecord {
        serde_json::from_value(json!({
            "id": 12,
            "rev": 4,
            "fields": {
                "System.WorkItemType": "User Story",
                "System.Title": "Sign in: with e-mail & password!",
                "System.Description": "<p>Users sign in</p>",
                "Microsoft.VSTS.Common.AcceptanceCriteria": null,
                "System.State": "New",
                "Microsoft.VSTS.Common.Priority": 2,
                "System.Parent": 3
            },
            "url": "https://example.invalid/12",
            "relations": []
        }))
        .unwrap()
    }

    #[test]
    fn record_reads_known_fields() {
        let record = sample_record();

        assert_eq!(record.id, WorkItemId::new(12));
        assert_eq!(record.rev, Some(4));
        assert_eq!(record.item_type(), "User Story");
        assert_eq!(record.parent_id(), Some(WorkItemId::new(3)));
        assert_eq!(record.tracked_value(TrackedField::Priority), Some(&json!(2)));
    }

    #[test]
    fn null_field_reads_as_absent() {
        let record = sample_record();
        assert_eq!(record.tracked_value(TrackedField::AcceptanceCriteria), None);
    }

    #[test]
    fn record_preserves_unknown_keys() {
        let record = sample_record();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["url"], json!("https://example.invalid/12"));
        assert_eq!(value["relations"], json!([]));
        assert_eq!(value["fields"]["System.State"], json!("New"));
    }

    #[test]
    fn file_name_sanitizes_title() {
        let record = sample_record();
        assert_eq!(
            record.file_name(),
            "User_Story_12_Sign_in_with_e-mail__password.json"
        );
    }

    #[test]
    fn file_name_truncates_long_titles() {
        let record = WorkItemRecord::new(WorkItemId::new(5))
            .with_field(field::WORK_ITEM_TYPE, "Task")
            .with_field(field::TITLE, "x".repeat(80));

        let name = record.file_name();
        assert_eq!(name, format!("Task_5_{}.json", "x".repeat(50)));
    }

    #[test]
    fn typed_view_substitutes_empty_strings() {
        let record = WorkItemRecord::new(WorkItemId::new(9));
        let item = record.to_work_item();

        assert_eq!(item.item_type, "");
        assert_eq!(item.title, "");
        assert_eq!(item.description, "");
        assert_eq!(item.acceptance_criteria, "");
        assert_eq!(item.parent_id, None);
    }

    #[test]
    fn parent_accepts_string_reference() {
        let record = WorkItemRecord::new(WorkItemId::new(9)).with_field(field::PARENT, "4");
        assert_eq!(record.parent_id(), Some(WorkItemId::new(4)));

        let record = WorkItemRecord::new(WorkItemId::new(9)).with_field(field::PARENT, 0);
        assert_eq!(record.parent_id(), None);
    }

    #[test]
    fn tracked_fields_map_to_reference_names() {
        let names: Vec<_> = TrackedField::ALL.iter().map(|f| f.reference_name()).collect();
        assert_eq!(
            names,
            vec![
                "System.Title",
                "System.Description",
                "Microsoft.VSTS.Common.AcceptanceCriteria",
                "System.State",
                "Microsoft.VSTS.Common.Priority",
            ]
        );
    }
}
