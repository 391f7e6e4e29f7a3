//! Wire types for the tracker REST API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChangeRecord, WorkItemId};

/// Query that lists every work item in ID order
pub const ALL_ITEMS_QUERY: &str = "SELECT [System.Id] FROM WorkItems ORDER BY [System.Id]";

/// Body of a WIQL query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiqlRequest {
    pub query: String,
}

impl WiqlRequest {
    pub fn all_items() -> Self {
        Self {
            query: ALL_ITEMS_QUERY.to_string(),
        }
    }
}

/// Body of a WIQL query response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    pub work_items: Vec<WiqlReference>,
}

/// Reference to a work item in a query result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiqlReference {
    pub id: WorkItemId,
}

/// JSON-patch operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    Add,
}

/// One entry of a JSON-patch document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: Value,
}

/// Builds the JSON-patch document for a change
///
/// A cleared field is sent as `null`.
pub fn patch_document(change: &ChangeRecord) -> Vec<PatchOperation> {
    change
        .changed_fields
        .iter()
        .map(|(field, value)| PatchOperation {
            op: PatchOp::Add,
            path: format!("/fields/{}", field.reference_name()),
            value: value.clone().unwrap_or(Value::Null),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrackedField;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn wiql_request_shape() {
        let body = serde_json::to_value(WiqlRequest::all_items()).unwrap();
        assert_eq!(
            body,
            json!({"query": "SELECT [System.Id] FROM WorkItems ORDER BY [System.Id]"})
        );
    }

    #[test]
    fn wiql_response_parses_ids() {
        let response: WiqlResponse = serde_json::from_value(json!({
            "queryType": "flat",
            "workItems": [{"id": 3, "url": "x"}, {"id": 8, "url": "y"}]
        }))
        .unwrap();

        let ids: Vec<u32> = response.work_items.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![3, 8]);
    }

    #[test]
    fn wiql_response_without_items_is_empty() {
        let response: WiqlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.work_items.is_empty());
    }

    #[test]
    fn patch_document_uses_add_and_field_paths() {
        let mut changed_fields = BTreeMap::new();
        changed_fields.insert(TrackedField::State, Some(json!("Active")));
        changed_fields.insert(TrackedField::Title, Some(json!("New title")));
        changed_fields.insert(TrackedField::Description, None);
        let change = ChangeRecord {
            id: WorkItemId::new(5),
            changed_fields,
        };

        let body = serde_json::to_value(patch_document(&change)).unwrap();
        assert_eq!(
            body,
            json!([
                {"op": "add", "path": "/fields/System.Title", "value": "New title"},
                {"op": "add", "path": "/fields/System.Description", "value": null},
                {"op": "add", "path": "/fields/System.State", "value": "Active"}
            ])
        );
    }
}
