//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init`, `status` |
//! | Sync | Exchange items with the tracker | `fetch`, `push` |
//! | Query | Inspect local state | `changes`, `tree` |
//! | Docs | Requirements document | `docs`, `docs --output FILE` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default comes from `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; it also lowers the log level
//! to `debug` unless `RUST_LOG` says otherwise:
//! ```bash
//! workitems --verbose fetch
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod docs_cmd;
mod output;
mod query;
mod sync_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
