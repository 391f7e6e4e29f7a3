//! Document generation command

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::output::Output;
use crate::docs::{render_document, DocumentHeader};
use crate::domain::{Detached, Hierarchy};
use crate::storage::{DocumentFile, Workspace};

/// Renders `download/` into the requirements document
///
/// Returns the path written and the number of items rendered.
pub(crate) fn generate(
    workspace: &Workspace,
    output_override: Option<&Path>,
    output: &Output,
) -> Result<(PathBuf, usize)> {
    let (records, skipped) = workspace.download_store().load_all_with_skipped()?;
    output.verbose_ctx("docs", &format!("Loaded {} records", records.len()));
    for path in &skipped {
        output.verbose_ctx("docs", &format!("Skipped unreadable record {}", path.display()));
    }

    let hierarchy = Hierarchy::build(records.values().map(|r| r.to_work_item()));
    for (id, reason) in hierarchy.detached() {
        match reason {
            Detached::MissingParent(parent) => output.verbose_ctx(
                "docs",
                &format!("#{} has unknown parent #{}, rendered as a root", id, parent),
            ),
            Detached::Cycle(parent) => output.verbose_ctx(
                "docs",
                &format!("#{} is in a parent cycle via #{}, rendered as a root", id, parent),
            ),
        }
    }

    let document = &workspace.config().project.document;
    let header = DocumentHeader {
        title: document.title.clone(),
        subtitle: document.subtitle.clone(),
    };
    let text = render_document(&hierarchy, &header);

    let file = match output_override {
        Some(path) => DocumentFile::new(path),
        None => workspace.document(),
    };

    let _lock = workspace.lock()?;
    file.write(&text)?;

    Ok((file.path().to_path_buf(), hierarchy.len()))
}

/// Generate the requirements document from downloaded items
pub fn run(output: &Output, output_path: Option<&Path>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let (path, count) = generate(&workspace, output_path, output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "document": path.display().to_string(),
            "items": count,
        }));
    } else {
        println!("Documentation generated in {} ({} work items)", path.display(), count);
    }

    Ok(())
}
