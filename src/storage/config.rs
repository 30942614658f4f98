//! Configuration handling for shapegraph
//!
//! Configuration is read from `~/.config/shapegraph/config.toml` (global) and
//! the nearest `.shapegraph.toml` in the current directory or a parent
//! (local). Local values override global ones; command-line flags override
//! both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::CyclePolicy;

/// File name of the local configuration
pub const LOCAL_CONFIG_FILE: &str = ".shapegraph.toml";

/// Largest accepted tree indent, from configuration or `--indent`
pub const MAX_TREE_INDENT: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One configuration file; every key is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Default output format
    pub format: Option<OutputFormat>,

    /// Spaces per depth level in dependency trees
    pub tree_indent: Option<usize>,

    /// Behaviour when a dependency tree contains a cycle
    pub on_cycle: Option<CyclePolicy>,
}

impl ConfigFile {
    /// Parses TOML configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads a configuration file; a missing file is an empty configuration
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Returns `self` with unset keys filled from `base`
    pub fn over(self, base: ConfigFile) -> ConfigFile {
        ConfigFile {
            format: self.format.or(base.format),
            tree_indent: self.tree_indent.or(base.tree_indent),
            on_cycle: self.on_cycle.or(base.on_cycle),
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub format: OutputFormat,
    pub tree_indent: usize,
    pub on_cycle: CyclePolicy,

    /// Local configuration file in use, if any
    pub local_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            tree_indent: 4,
            on_cycle: CyclePolicy::Error,
            local_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = match Self::global_config_path() {
            Some(path) => ConfigFile::read(&path)?,
            None => ConfigFile::default(),
        };

        let local_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_local_config(&dir));
        let local = match &local_path {
            Some(path) => ConfigFile::read(path)?,
            None => ConfigFile::default(),
        };

        let mut config = Self::from_file(local.over(global))?;
        config.local_path = local_path;
        Ok(config)
    }

    /// Resolves a configuration file against the defaults
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let tree_indent = file.tree_indent.unwrap_or(defaults.tree_indent);

        if tree_indent > MAX_TREE_INDENT {
            return Err(ConfigError::Invalid(format!(
                "tree_indent must be at most {}, got {}",
                MAX_TREE_INDENT, tree_indent
            )));
        }

        Ok(Self {
            format: file.format.unwrap_or(defaults.format),
            tree_indent,
            on_cycle: file.on_cycle.unwrap_or(defaults.on_cycle),
            local_path: None,
        })
    }

    /// Returns the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shapegraph", "shapegraph")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Finds the nearest local config file at or above `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(LOCAL_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
