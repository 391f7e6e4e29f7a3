//! Configuration handling
//!
//! Configuration is stored in `.workitems/config.toml` (workspace) and
//! `~/.config/workitem-docs/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::workspace::WORKSPACE_DIR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Connection settings for the remote work item tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Organization name (`https://dev.azure.com/{organization}`)
    pub organization: String,

    /// Project name within the organization
    pub project: String,

    /// Full project URL, overrides organization/project (self-hosted servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// REST API version sent with every request
    pub api_version: String,

    /// Environment variable holding the personal access token
    pub pat_env: String,

    /// Extra attempts for a failed item fetch
    pub retries: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            organization: String::new(),
            project: String::new(),
            base_url: None,
            api_version: "7.0".to_string(),
            pat_env: "ADO_PAT".to_string(),
            retries: 2,
        }
    }
}

impl RemoteConfig {
    /// Returns the project base URL without a trailing slash
    pub fn project_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().trim_end_matches('/').to_string());
        }

        if self.organization.trim().is_empty() || self.project.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote.organization and remote.project must be set (or remote.base_url)"
                    .to_string(),
            ));
        }

        Ok(format!(
            "https://dev.azure.com/{}/{}",
            self.organization.trim(),
            self.project.trim()
        ))
    }
}

/// Settings for the generated requirements document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// First line of the document
    pub title: String,

    /// Line under the title
    pub subtitle: String,

    /// Output path, relative to `.workitems/` unless absolute
    pub output: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Project Requirements".to_string(),
            subtitle: "Generated from Azure DevOps work items".to_string(),
            output: PathBuf::from("Requirements.md"),
        }
    }
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Remote tracker settings
    pub remote: RemoteConfig,

    /// Document settings
    pub document: DocumentConfig,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Personal access token used when the environment variable is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub workspace_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific workspace
    pub fn for_workspace(workspace_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(workspace_root)?;

        Ok(Self {
            project,
            global,
            workspace_root: Some(workspace_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "workitems", "workitem-docs")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse global config: {}", config_path.display()))
    }

    /// Loads workspace configuration from a specific root
    fn load_project_config(workspace_root: &Path) -> Result<ProjectConfig> {
        let config_path = workspace_root.join(WORKSPACE_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse workspace config: {}", config_path.display()))
    }

    /// Finds the workspace root by looking for a `.workitems/` directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Saves the workspace configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self
            .workspace_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a workspace. Run 'workitems init' first."))?;
        let config_path = root.join(WORKSPACE_DIR).join("config.toml");

        let content = toml::to_string_pretty(&self.project)
            .context("Failed to serialize workspace config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write workspace config: {}", config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = ProjectConfig::default();

        assert_eq!(config.remote.api_version, "7.0");
        assert_eq!(config.remote.pat_env, "ADO_PAT");
        assert_eq!(config.document.title, "Project Requirements");
        assert_eq!(config.document.output, PathBuf::from("Requirements.md"));
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
[remote]
organization = "acme"
project = "shop"
retries = 0

[document]
title = "Shop Requirements"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.remote.organization, "acme");
        assert_eq!(config.remote.retries, 0);
        assert_eq!(config.remote.api_version, "7.0");
        assert_eq!(config.document.title, "Shop Requirements");
        assert_eq!(config.document.subtitle, "Generated from Azure DevOps work items");
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
pat = "secret"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.pat.as_deref(), Some("secret"));
    }

    #[test]
    fn project_url_from_organization() {
        let remote = RemoteConfig {
            organization: "acme".to_string(),
            project: "shop".to_string(),
            ..RemoteConfig::default()
        };

        assert_eq!(remote.project_url().unwrap(), "https://dev.azure.com/acme/shop");
    }

    #[test]
    fn project_url_prefers_base_url() {
        let remote = RemoteConfig {
            base_url: Some("https://tfs.example.com/coll/proj/".to_string()),
            ..RemoteConfig::default()
        };

        assert_eq!(remote.project_url().unwrap(), "https://tfs.example.com/coll/proj");
    }

    #[test]
    fn project_url_requires_settings() {
        let err = RemoteConfig::default().project_url().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn workspace_config_round_trip() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(WORKSPACE_DIR)).unwrap();

        let mut config = Config::for_workspace(dir.path()).unwrap();
        config.project.remote.organization = "acme".to_string();
        config.save_project().unwrap();

        let reloaded = Config::for_workspace(dir.path()).unwrap();
        assert_eq!(reloaded.project.remote.organization, "acme");
        assert_eq!(reloaded.workspace_root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ws = dir.path().join(WORKSPACE_DIR);
        fs::create_dir_all(&ws).unwrap();
        fs::write(ws.join("config.toml"), "remote = 3").unwrap();

        assert!(Config::for_workspace(dir.path()).is_err());
    }
}
