//! JSON file storage for work item records
//!
//! Each record lives in its own pretty-printed JSON file inside a directory,
//! named by [`WorkItemRecord::file_name`]. The `download/` and `.snapshot/`
//! directories of a workspace are both record stores.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{WorkItemId, WorkItemRecord};

/// Store for work item records, one JSON file per item
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Creates a new record store at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory containing record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the `.json` files in the store, sorted by name
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read record directory: {}", self.dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in {}", self.dir.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Reads all records from the store, keyed by ID
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn load_all(&self) -> Result<BTreeMap<WorkItemId, WorkItemRecord>> {
        Ok(self.load_all_with_skipped()?.0)
    }

    /// Like [`RecordStore::load_all`], also returning the skipped files
    pub fn load_all_with_skipped(
        &self,
    ) -> Result<(BTreeMap<WorkItemId, WorkItemRecord>, Vec<PathBuf>)> {
        let mut records = BTreeMap::new();
        let mut skipped = Vec::new();

        for path in self.record_files()? {
            let record = match read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("skipping {:#}", e);
                    skipped.push(path);
                    continue;
                }
            };

            if records.contains_key(&record.id) {
                log::warn!(
                    "work item {} appears in more than one file, using {}",
                    record.id,
                    path.display()
                );
            }
            records.insert(record.id, record);
        }

        Ok((records, skipped))
    }

    /// Returns the number of record files in the store
    pub fn count(&self) -> Result<usize> {
        Ok(self.record_files()?.len())
    }

    /// Writes a single record (atomic: temp file + rename)
    pub fn save(&self, record: &WorkItemRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.dir.join(record.file_name());
        let temp_path = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(record)
            .with_context(|| format!("Failed to serialize work item {}", record.id))?;

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        Ok(path)
    }

    /// Replaces the store contents with the given records (full rewrite)
    pub fn save_all(&self, records: &BTreeMap<WorkItemId, WorkItemRecord>) -> Result<()> {
        self.clear()?;

        for record in records.values() {
            self.save(record)?;
        }

        Ok(())
    }

    /// Replaces `target` with a byte-for-byte copy of this store
    pub fn copy_to(&self, target: &RecordStore) -> Result<usize> {
        target.clear()?;

        let files = self.record_files()?;
        for source in &files {
            let Some(name) = source.file_name() else {
                continue;
            };
            let dest = target.dir.join(name);
            fs::copy(source, &dest).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), dest.display())
            })?;
        }

        Ok(files.len())
    }

    /// Removes every file in the store and recreates the empty directory
    fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)
                .with_context(|| format!("Failed to remove directory: {}", self.dir.display()))?;
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))
    }
}

fn read_record(path: &Path) -> Result<WorkItemRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read record: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record: {}", path.display()))
}
