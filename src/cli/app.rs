//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::Output;
use super::{graph_cmd, ops_cmd, refcount_cmd};
use crate::domain::CyclePolicy;
use crate::storage::{Config, OutputFormat, MAX_TREE_INDENT};

#[derive(Parser)]
#[command(name = "shapegraph")]
#[command(author, version, about = "Dependency analysis for API shape documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format, then text)
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
    /// Print the shapes an operation references, in dependency order
    Graph {
        /// Path to the JSON document
        input_file: PathBuf,

        /// Operation to analyze
        operation: String,

        /// Spaces per depth level
        #[arg(long, value_parser = clap::value_parser!(u16).range(..=MAX_TREE_INDENT as i64))]
        indent: Option<u16>,

        /// What to do when the shape graph loops back on itself
        #[arg(long, value_enum)]
        on_cycle: Option<CyclePolicy>,
    },

    /// List supported operations
    ListOps {
        /// Path to the JSON document
        input_file: PathBuf,
    },

    /// Count references of shapes and remove unreferenced ones
    RefCount {
        /// Path to the JSON document
        input_file: PathBuf,

        /// Path to write the document to after removing unreferenced shapes
        #[arg(long, required_unless_present = "dry_run")]
        output_file: Option<PathBuf>,

        /// Only report unreferenced shapes without removing them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` is honoured unless `verbose` forces debug output.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shapegraph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shapegraph=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    if let Some(path) = &config.local_path {
        debug!(path = %path.display(), "Using local config");
    }

    let output = Output::new(cli.format.unwrap_or(config.format));

    match cli.command {
        Commands::Graph {
            input_file,
            operation,
            indent,
            on_cycle,
        } => {
            debug!(operation = %operation, "Printing dependency tree");
            let indent = indent.map(usize::from).unwrap_or(config.tree_indent);
            let on_cycle = on_cycle.unwrap_or(config.on_cycle);
            graph_cmd::run(&output, &input_file, &operation, indent, on_cycle)?
        }

        Commands::ListOps { input_file } => ops_cmd::run(&output, &input_file)?,

        Commands::RefCount {
            input_file,
            output_file,
            dry_run,
        } => {
            debug!(dry_run, "Counting shape references");
            refcount_cmd::run(&output, &input_file, output_file.as_deref(), dry_run)?
        }
    }

    debug!("Command completed successfully");
    Ok(())
}
