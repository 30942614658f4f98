//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `graph <file> <operation>` | Print the shapes an operation depends on |
//! | `list-ops <file>` | List supported operations |
//! | `ref-count <file> [--output-file <path>] [--dry-run]` | Count shape references, prune unreferenced shapes |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. `RUST_LOG` is honoured;
//! `--verbose` (or `-v`) turns on debug output:
//! ```bash
//! shapegraph --verbose ref-count api.json --dry-run
//! ```
//!
//! ## Entry Point
//!
//! Parse a [`Cli`], call [`init_logging`], then [`run()`].

mod app;
mod output;
mod graph_cmd;
mod ops_cmd;
mod refcount_cmd;

pub use app::{init_logging, run, Cli, Commands};
pub use output::Output;
pub use crate::storage::OutputFormat;
