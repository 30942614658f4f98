//! # Storage Layer
//!
//! Reading and writing API documents, and loading configuration.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | API document | JSON | given on the command line |
//! | Pruned document | JSON, 2-space indent | `--output-file` |
//! | Global config | TOML | `~/.config/shapegraph/config.toml` |
//! | Local config | TOML | nearest `.shapegraph.toml` |
//!
//! Document writes are atomic (temp file + rename).

mod config;
mod spec_file;

pub use config::{
    Config, ConfigError, ConfigFile, OutputFormat, LOCAL_CONFIG_FILE, MAX_TREE_INDENT,
};
pub use spec_file::{SpecFile, SpecFileError};
