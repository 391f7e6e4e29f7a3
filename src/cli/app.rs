//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{docs_cmd, query, sync_cmd};
use crate::storage::{Config, Workspace, WORKSPACE_DIR};

#[derive(Parser)]
#[command(name = "workitems")]
#[command(
    author,
    version,
    about = "Pull work items, track local edits, and generate requirements documents"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workitems workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Organization on dev.azure.com
        #[arg(long)]
        organization: Option<String>,

        /// Project within the organization
        #[arg(long)]
        project: Option<String>,
    },

    /// Download all work items and regenerate the document
    Fetch {
        /// Skip document generation
        #[arg(long)]
        no_docs: bool,
    },

    /// Show local edits not yet pushed
    Changes,

    /// Send local edits back to the tracker
    Push {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Generate the requirements document from downloaded items
    Docs {
        /// Write to this path instead of the configured output
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show workspace status overview
    Status,

    /// Show the work item hierarchy
    Tree,
}

/// Installs the `log` backend; `RUST_LOG` overrides the level
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);
    init_logging(output.is_verbose());

    output.verbose("workitems starting");

    match cli.command {
        Commands::Init {
            path,
            organization,
            project,
        } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path.display()));
            let mut workspace = Workspace::init(&path)?;

            if organization.is_some() || project.is_some() {
                let remote = &mut workspace.config_mut().project.remote;
                if let Some(organization) = organization {
                    remote.organization = organization;
                }
                if let Some(project) = project {
                    remote.project = project;
                }
                workspace.config().save_project()?;
                output.verbose_ctx("init", "Saved remote settings to config.toml");
            }

            output.verbose_ctx(
                "init",
                &format!("Created {} at: {}", WORKSPACE_DIR, workspace.dir().display()),
            );
            output.success(&format!(
                "Initialized workitems workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Fetch { no_docs } => sync_cmd::fetch(&output, no_docs)?,
        Commands::Changes => query::changes(&output)?,
        Commands::Push { yes } => sync_cmd::push_changes(&output, yes)?,
        Commands::Docs { output: path } => docs_cmd::run(&output, path.as_deref())?,
        Commands::Status => {
            output.verbose("Gathering workspace status");
            query::status(&output)?
        }
        Commands::Tree => query::tree(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_is_optional() {
        let cli = Cli::try_parse_from(["workitems", "status"]).unwrap();
        assert!(cli.format.is_none());

        let cli = Cli::try_parse_from(["workitems", "--format", "json", "changes"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn push_accepts_yes() {
        let cli = Cli::try_parse_from(["workitems", "push", "-y"]).unwrap();
        assert!(matches!(cli.command, Commands::Push { yes: true }));
    }
}
