//! Requirements document rendering
//!
//! Walks a [`Hierarchy`] depth-first and emits one markdown block per work
//! item. A block nests its children inline, indented two spaces per level,
//! with the heading level following the depth.
//!
//! ```text
//! # Checkout
//! *Feature #1*
//!
//! > Lets customers pay.
//!
//! **Acceptance Criteria:**
//! - Given a cart
//!   When I pay
//!
//!   ## Pay by card
//!   *User Story #4*
//! ```

use super::clean::{format_section, strip_html};
use crate::domain::{Hierarchy, WorkItemId};

/// Document header lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub title: String,
    pub subtitle: String,
}

impl Default for DocumentHeader {
    fn default() -> Self {
        Self {
            title: "Project Requirements".to_string(),
            subtitle: "Generated from Azure DevOps work items".to_string(),
        }
    }
}

impl DocumentHeader {
    fn title_line(&self) -> String {
        format!("# {}", self.title)
    }
}

/// Formats acceptance criteria as a bullet per scenario
///
/// Scenarios are separated by blank lines. The first line of a scenario
/// carries the bullet; later lines are continuation lines indented two
/// further spaces.
pub fn format_criteria(criteria: &str, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for scenario in criteria.split("\n\n") {
        let mut scenario_lines = scenario.lines().map(str::trim).filter(|line| !line.is_empty());

        if let Some(first) = scenario_lines.next() {
            lines.push(format!("{}- {}", indent, first));
            lines.extend(scenario_lines.map(|line| format!("{}  {}", indent, line)));
        }
    }

    lines
}

/// Renders one work item and all of its descendants
///
/// Unknown IDs render as an empty string.
pub fn render_item(hierarchy: &Hierarchy, id: WorkItemId, depth: usize) -> String {
    let Some(item) = hierarchy.get(id) else {
        return String::new();
    };

    let indent = "  ".repeat(depth);
    let mut md = vec![
        format!("{}{} {}", indent, "#".repeat(depth + 1), item.title),
        format!("{}*{} #{}*", indent, item.item_type, item.id),
        String::new(),
    ];

    let description = strip_html(&item.description);
    if !description.is_empty() {
        md.extend(format_section(&description, &indent));
    }

    let criteria = strip_html(&item.acceptance_criteria);
    if !criteria.is_empty() {
        md.push(format!("{}**Acceptance Criteria:**", indent));
        md.extend(format_criteria(&criteria, &indent));
        md.push(String::new());
    }

    for child in hierarchy.children(id) {
        md.push(render_item(hierarchy, *child, depth + 1));
    }

    md.join("\n")
}

/// Renders the whole forest under a document header
pub fn render_document(hierarchy: &Hierarchy, header: &DocumentHeader) -> String {
    let mut doc = vec![header.title_line(), header.subtitle.clone(), String::new()];

    doc.extend(
        hierarchy
            .roots()
            .iter()
            .map(|root| render_item(hierarchy, *root, 0)),
    );

    doc.join("\n")
}
