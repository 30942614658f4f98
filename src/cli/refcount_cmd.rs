//! Reference count / prune command

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;

use super::output::Output;
use crate::domain::count_references;
use crate::storage::SpecFile;

const SEPARATOR: &str = "===================================";

/// Reports reference counts and, unless `dry_run`, writes the pruned document
pub fn run(output: &Output, input: &Path, output_file: Option<&Path>, dry_run: bool) -> Result<()> {
    let mut file = SpecFile::load(input)?;
    let report = count_references(file.spec());
    let unreferenced = report.unreferenced();

    for entry in &report.entries {
        output.line(&format!(
            "{}: n(shapes)={}, n(ops)={}",
            entry.name, entry.shape_refs, entry.op_refs
        ));
    }
    output.blank();
    output.line(SEPARATOR);
    output.blank();
    output.line(&format!("Total unreferenced shapes: {}", unreferenced.len()));
    for name in &unreferenced {
        output.line(name);
    }

    if dry_run {
        output.line("Dry run mode. No shapes will be removed.");
        output.data(&serde_json::json!({
            "shapes": report.entries,
            "unreferenced": unreferenced,
            "dry_run": true,
        }));
        return Ok(());
    }

    let path = output_file
        .ok_or_else(|| anyhow!("--output-file is required unless --dry-run is specified"))?;

    let removed = file.remove_shapes(&unreferenced);
    file.write_to(path)?;
    info!(removed, path = %path.display(), "Wrote pruned document");

    output.data(&serde_json::json!({
        "shapes": report.entries,
        "unreferenced": unreferenced,
        "dry_run": false,
        "removed": removed,
        "output_file": path.display().to_string(),
    }));

    Ok(())
}
