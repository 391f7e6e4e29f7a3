//! Query commands (changes, status, tree)
//!
//! These commands only read the workspace.

use anyhow::Result;
use serde_json::Value;

use super::output::Output;
use crate::domain::{ChangeRecord, Hierarchy, WorkItem};
use crate::remote::pending_changes;
use crate::storage::Workspace;

/// Longest field value shown in a change listing
const PREVIEW_LEN: usize = 100;

/// Renders a field value for a change listing
fn preview(value: Option<&Value>) -> String {
    let text = match value {
        None => return "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    if text.chars().count() > PREVIEW_LEN {
        let cut: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

/// Prints changed items and their fields (text mode)
pub(super) fn print_changes(changes: &[ChangeRecord]) {
    println!("Found {} work items with changes:", changes.len());
    for change in changes {
        println!("Work item #{}:", change.id);
        for (field, value) in &change.changed_fields {
            println!("  {}: {}", field.reference_name(), preview(value.as_ref()));
        }
    }
}

/// Show local edits not yet pushed
pub fn changes(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    output.verbose_ctx(
        "changes",
        &format!("Opened workspace at: {}", workspace.root().display()),
    );

    let changes = pending_changes(&workspace)?;
    output.verbose_ctx("changes", &format!("Found {} changed items", changes.len()));

    if output.is_json() {
        output.data(&changes);
    } else if changes.is_empty() {
        println!("No changes detected.");
    } else {
        print_changes(&changes);
    }

    Ok(())
}

/// Show workspace status overview
pub fn status(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let state = workspace.state()?;

    let downloaded = workspace.download_store().count()?;
    let snapshot = workspace.snapshot_store().count()?;
    let pending = pending_changes(&workspace)?.len();
    let remote = workspace.config().project.remote.project_url().ok();

    if output.is_json() {
        output.data(&serde_json::json!({
            "workspace": workspace.root().display().to_string(),
            "remote": remote,
            "last_fetch": state.last_fetch,
            "downloaded": downloaded,
            "snapshot": snapshot,
            "pending_changes": pending,
            "document": workspace.document().path().display().to_string(),
        }));
    } else {
        println!("Workspace: {}", workspace.root().display());
        println!("Remote: {}", remote.as_deref().unwrap_or("(not configured)"));
        match state.last_fetch {
            Some(at) => println!("Last fetch: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("Last fetch: never"),
        }
        println!();
        println!("Work items: {} downloaded, {} in snapshot", downloaded, snapshot);
        println!("Pending changes: {}", pending);
        println!("Document: {}", workspace.document().path().display());
    }

    Ok(())
}

/// Show the parent/child hierarchy of downloaded items
pub fn tree(output: &Output) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let records = workspace.download_store().load_all()?;
    let hierarchy = Hierarchy::build(records.values().map(|r| r.to_work_item()));

    output.verbose_ctx(
        "tree",
        &format!(
            "{} items, {} roots, {} detached",
            hierarchy.len(),
            hierarchy.roots().len(),
            hierarchy.detached().len()
        ),
    );

    let entries = hierarchy.depth_first();

    if output.is_json() {
        let items: Vec<_> = entries
            .iter()
            .map(|(depth, item)| {
                serde_json::json!({
                    "id": item.id,
                    "type": item.item_type,
                    "title": item.title,
                    "depth": depth,
                    "parent_id": item.parent_id,
                })
            })
            .collect();
        output.data(&items);
    } else if entries.is_empty() {
        println!("No work items. Run 'workitems fetch' first.");
    } else {
        for (depth, item) in entries {
            println!("{}", tree_line(depth, item));
        }
    }

    Ok(())
}

fn tree_line(depth: usize, item: &WorkItem) -> String {
    format!("{}#{} [{}] {}", "  ".repeat(depth), item.id, item.item_type, item.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_of_absent_value() {
        assert_eq!(preview(None), "None");
    }

    #[test]
    fn preview_keeps_short_values() {
        assert_eq!(preview(Some(&json!("Active"))), "Active");
        assert_eq!(preview(Some(&json!(2))), "2");
    }

    #[test]
    fn preview_truncates_long_values() {
        let long = "é".repeat(150);
        let shown = preview(Some(&json!(long)));

        assert_eq!(shown, format!("{}...", "é".repeat(100)));
    }

    #[test]
    fn tree_line_indents_by_depth() {
        let item = WorkItem::new(4u32, "Task", "Write tests");
        assert_eq!(tree_line(2, &item), "    #4 [Task] Write tests");
    }
}
