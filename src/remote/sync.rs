//! Pull and push between an item source and a workspace
//!
//! Pull replaces `download/` with fresh records and mirrors it into
//! `.snapshot/`. Push sends the differences between the two back to the
//! source, one item at a time.

use std::collections::{BTreeMap, HashMap, HashSet};

use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ItemSource, RemoteError};
use crate::domain::{detect_changes, ChangeRecord, WorkItemId, WorkItemRecord};
use crate::storage::{SyncState, Workspace};

/// Outcome of a pull
#[derive(Debug, Clone, Serialize)]
pub struct PullReport {
    /// Number of records written to `download/`
    pub fetched: usize,

    /// When the pull completed
    pub fetched_at: DateTime<Utc>,
}

/// An update the source rejected
#[derive(Debug, Clone, Serialize)]
pub struct PushFailure {
    pub id: WorkItemId,
    pub error: String,
}

/// Outcome of a push
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushReport {
    /// Number of items updated successfully
    pub updated: usize,

    /// Items whose update failed
    pub failed: Vec<PushFailure>,
}

/// Fetches one record, retrying transient failures
fn fetch_with_retry<S: ItemSource + ?Sized>(
    source: &S,
    id: WorkItemId,
    retries: u32,
) -> Result<WorkItemRecord, RemoteError> {
    let mut attempt = 0;
    loop {
        match source.fetch(id) {
            Ok(record) => return Ok(record),
            Err(e) if attempt < retries => {
                attempt += 1;
                log::warn!(
                    "fetch of work item {} failed ({}), retry {}/{}",
                    id,
                    e,
                    attempt,
                    retries
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetches every item from the source into the workspace
///
/// All records are fetched before anything on disk is touched, so a failed
/// pull leaves the previous working copy and snapshot in place.
pub fn pull<S: ItemSource + ?Sized>(
    source: &S,
    workspace: &Workspace,
    retries: u32,
) -> Result<PullReport> {
    pull_keeping(source, workspace, retries, &HashSet::new())
}

/// Like [`pull`], but keeps the working copy of the `keep` items
///
/// The snapshot always takes the fetched record, so local edits of kept
/// items still show up as pending changes afterwards.
pub fn pull_keeping<S: ItemSource + ?Sized>(
    source: &S,
    workspace: &Workspace,
    retries: u32,
    keep: &HashSet<WorkItemId>,
) -> Result<PullReport> {
    let ids = source.list_ids().context("Failed to list work items")?;
    log::debug!("found {} work items", ids.len());

    let mut records = BTreeMap::new();
    for id in ids {
        let record = fetch_with_retry(source, id, retries)
            .with_context(|| format!("Failed to fetch work item {}", id))?;
        records.insert(record.id, record);
    }

    let _lock = workspace.lock()?;

    let download = workspace.download_store();
    let kept: Vec<WorkItemRecord> = if keep.is_empty() {
        Vec::new()
    } else {
        download
            .load_all()?
            .into_values()
            .filter(|r| keep.contains(&r.id) && records.contains_key(&r.id))
            .collect()
    };

    download.save_all(&records)?;
    download
        .copy_to(&workspace.snapshot_store())
        .context("Failed to refresh snapshot")?;

    for local in &kept {
        if let Some(fetched) = records.get(&local.id) {
            if fetched.file_name() != local.file_name() {
                let stale = download.dir().join(fetched.file_name());
                fs::remove_file(&stale)
                    .with_context(|| format!("Failed to remove {}", stale.display()))?;
            }
        }
        download.save(local)?;
        log::debug!("kept local copy of work item {}", local.id);
    }

    let fetched_at = Utc::now();
    workspace.save_state(&SyncState {
        last_fetch: Some(fetched_at),
        item_count: records.len(),
    })?;

    Ok(PullReport {
        fetched: records.len(),
        fetched_at,
    })
}

/// Compares the working copy against the last snapshot
pub fn pending_changes(workspace: &Workspace) -> Result<Vec<ChangeRecord>> {
    let current = workspace.download_store().load_all()?;
    let snapshot: HashMap<_, _> = workspace.snapshot_store().load_all()?.into_iter().collect();

    Ok(detect_changes(current.values(), &snapshot))
}

/// Sends each change to the source
///
/// A rejected update is recorded and the remaining changes are still sent.
pub fn push<S: ItemSource + ?Sized>(source: &S, changes: &[ChangeRecord]) -> PushReport {
    let mut report = PushReport::default();

    for change in changes.iter().filter(|c| !c.is_empty()) {
        match source.apply_update(change) {
            Ok(()) => report.updated += 1,
            Err(e) => {
                log::warn!("update of work item {} failed: {}", change.id, e);
                report.failed.push(PushFailure {
                    id: change.id,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
