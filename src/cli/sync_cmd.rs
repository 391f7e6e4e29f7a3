//! Sync commands (fetch, push)

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use super::docs_cmd;
use super::output::Output;
use super::query::print_changes;
use crate::domain::WorkItemId;
use crate::remote::{pending_changes, pull_keeping, push, AdoClient, PullReport};
use crate::storage::Workspace;

/// Pulls every item and regenerates the document
///
/// The working copies of `keep` items are left as they are.
fn refresh(
    workspace: &Workspace,
    output: &Output,
    no_docs: bool,
    keep: &HashSet<WorkItemId>,
) -> Result<PullReport> {
    let client = AdoClient::from_config(workspace.config())?;
    output.verbose_ctx("fetch", &format!("Fetching from {}", client.base_url()));

    let retries = workspace.config().project.remote.retries;
    let report = pull_keeping(&client, workspace, retries, keep)?;
    output.verbose_ctx("fetch", &format!("Wrote {} records", report.fetched));

    if !no_docs {
        let (path, _) = docs_cmd::generate(workspace, None, output)?;
        output.verbose_ctx("fetch", &format!("Document written to {}", path.display()));
    }

    Ok(report)
}

/// Download all work items into the workspace
pub fn fetch(output: &Output, no_docs: bool) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let report = refresh(&workspace, output, no_docs, &HashSet::new())?;

    if output.is_json() {
        output.data(&report);
    } else {
        println!(
            "Fetched {} work items into {}",
            report.fetched,
            workspace.download_store().dir().display()
        );
        if !no_docs {
            println!("Documentation generated in {}", workspace.document().path().display());
        }
    }

    Ok(())
}

/// Asks for confirmation on stdin
fn confirm(question: &str, output: &Output) -> Result<bool> {
    if output.is_json() {
        eprint!("{} ", question);
        io::stderr().flush()?;
    } else {
        print!("\n{} ", question);
        io::stdout().flush()?;
    }

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Send local edits back to the tracker
pub fn push_changes(output: &Output, yes: bool) -> Result<()> {
    let workspace = Workspace::open_current()?;

    let changes = pending_changes(&workspace)?;
    output.verbose_ctx("push", &format!("Found {} changed items", changes.len()));

    if changes.is_empty() {
        output.success("No changes detected.");
        return Ok(());
    }

    if !output.is_json() {
        print_changes(&changes);
    }

    if !yes && !confirm("Do you want to update these items? (y/n):", output)? {
        output.success("Update cancelled.");
        return Ok(());
    }

    let client = AdoClient::from_config(workspace.config())?;
    let report = push(&client, &changes);

    if report.updated > 0 {
        output.verbose_ctx("push", "Refreshing local copies");
        let keep: HashSet<_> = report.failed.iter().map(|f| f.id).collect();
        refresh(&workspace, output, false, &keep)?;
    }

    if output.is_json() {
        output.data(&report);
    } else {
        println!("Updated {} of {} work items", report.updated, changes.len());
        for failure in &report.failed {
            println!("  Failed #{}: {}", failure.id, failure.error);
        }
        if !report.failed.is_empty() {
            println!("Local edits kept for {} failed work item(s)", report.failed.len());
        }
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} work item update(s) failed", report.failed.len());
    }

    Ok(())
}
