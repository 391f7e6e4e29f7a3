//! Workspace management
//!
//! Handles workspace initialization and provides access to stores.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Config, DocumentFile, RecordStore};

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = ".workitems";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a workitems workspace. Run 'workitems init' first.")]
    NotInWorkspace,

    #[error("Failed to create workspace: {0}")]
    CreateFailed(String),
}

/// Bookkeeping about the last pull
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// When records were last fetched from the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetch: Option<DateTime<Utc>>,

    /// Number of records written by the last fetch
    #[serde(default)]
    pub item_count: usize,
}

/// Exclusive writer lock on a workspace, released on drop
pub struct WorkspaceLock {
    _file: File,
}

/// A local workspace holding downloaded records, the snapshot and config
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WORKSPACE_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a new workspace at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let dir = root.join(WORKSPACE_DIR);

        if dir.exists() && !dir.is_dir() {
            return Err(WorkspaceError::CreateFailed(format!(
                "{} exists and is not a directory",
                dir.display()
            ))
            .into());
        }

        for sub in ["download", ".snapshot"] {
            let path = dir.join(sub);
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# workitems configuration

[remote]
# Organization and project on dev.azure.com
organization = ""
project = ""

# Full project URL for self-hosted servers (overrides the two above)
# base_url = "https://tfs.example.com/DefaultCollection/Project"

api_version = "7.0"

# Environment variable holding the personal access token
pat_env = "ADO_PAT"

# Extra attempts for a failed item fetch
retries = 2

[document]
title = "Project Requirements"
subtitle = "Generated from Azure DevOps work items"

# Relative to .workitems/ unless absolute
output = "Requirements.md"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Last fetched copy, regenerated on every fetch
.snapshot/

# Local bookkeeping
state.json
.lock
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.workitems` directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the store holding the working copy of records
    pub fn download_store(&self) -> RecordStore {
        RecordStore::new(self.dir().join("download"))
    }

    /// Returns the store holding the records as last fetched
    pub fn snapshot_store(&self) -> RecordStore {
        RecordStore::new(self.dir().join(".snapshot"))
    }

    /// Returns the configured output document
    pub fn document(&self) -> DocumentFile {
        let output = &self.config.project.document.output;
        if output.is_absolute() {
            DocumentFile::new(output)
        } else {
            DocumentFile::new(self.dir().join(output))
        }
    }

    fn state_path(&self) -> PathBuf {
        self.dir().join("state.json")
    }

    /// Reads the sync state (default if never fetched)
    pub fn state(&self) -> Result<SyncState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(SyncState::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state: {}", path.display()))
    }

    /// Writes the sync state
    pub fn save_state(&self, state: &SyncState) -> Result<()> {
        let path = self.state_path();
        let content = serde_json::to_string_pretty(state).context("Failed to serialize state")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write state: {}", path.display()))
    }

    /// Acquires the exclusive writer lock, blocking until it is free
    pub fn lock(&self) -> Result<WorkspaceLock> {
        let path = self.dir().join(".lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on workspace")?;

        Ok(WorkspaceLock { _file: file })
    }
}
