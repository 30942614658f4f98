//! Operation listing command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::storage::SpecFile;

/// Lists supported operations as `{i}. {name}`
pub fn run(output: &Output, input: &Path) -> Result<()> {
    let index = SpecFile::load_operations(input)?;
    let numbered = index.numbered();

    if output.is_json() {
        let items: Vec<_> = numbered
            .iter()
            .map(|(index, name)| {
                serde_json::json!({
                    "index": index,
                    "name": name,
                })
            })
            .collect();
        output.data(&items);
    } else {
        for (index, name) in numbered {
            output.line(&format!("{}. {}", index, name));
        }
    }

    Ok(())
}
