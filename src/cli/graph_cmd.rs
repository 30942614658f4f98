//! Dependency tree command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::{dependency_tree, render_tree, CyclePolicy};
use crate::storage::SpecFile;

/// Prints the dependency tree of `operation`
pub fn run(
    output: &Output,
    input: &Path,
    operation: &str,
    indent: usize,
    on_cycle: CyclePolicy,
) -> Result<()> {
    let file = SpecFile::load(input)?;
    let lines = dependency_tree(file.spec(), operation, on_cycle)?;

    if output.is_json() {
        output.data(&lines);
    } else {
        print!("{}", render_tree(&lines, indent));
    }

    Ok(())
}
