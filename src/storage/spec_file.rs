//! API document files
//!
//! The raw JSON is kept alongside the typed [`ApiSpec`] so that pruning can
//! write the document back with every other key untouched and in its
//! original order.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ApiSpec, OperationIndex};

#[derive(Debug, Error)]
pub enum SpecFileError {
    #[error("Document root must be a JSON object: {0}")]
    NotAnObject(PathBuf),

    #[error("Malformed document {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// A loaded API document
#[derive(Debug, Clone)]
pub struct SpecFile {
    path: PathBuf,
    raw: Value,
    spec: ApiSpec,
}

impl SpecFile {
    /// Reads and parses the document at `path`
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        Self::parse(path, &content)
    }

    /// Reads only the operations of the document at `path`
    ///
    /// Shapes are not parsed, so listing works on documents whose shapes
    /// the typed model would reject.
    pub fn load_operations(path: &Path) -> Result<OperationIndex> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let raw = parse_object(path, &content)?;

        typed(path, raw)
    }

    /// Parses document text; `path` is only used for messages and writes
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let raw = parse_object(&path, content)?;
        let spec: ApiSpec = typed(&path, raw.clone())?;

        tracing::debug!(
            path = %path.display(),
            shapes = spec.shapes.len(),
            operations = spec.operations.len(),
            "Loaded document"
        );

        Ok(Self { path, raw, spec })
    }

    /// Returns the path the document was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the typed view
    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    /// Returns the raw document
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Deletes the named entries from `shapes`
    ///
    /// Returns how many entries were actually present.
    pub fn remove_shapes<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let mut removed = 0;

        if let Some(shapes) = self.raw.get_mut("shapes").and_then(Value::as_object_mut) {
            for name in names {
                if shapes.shift_remove(name.as_ref()).is_some() {
                    removed += 1;
                }
            }
        }
        for name in names {
            self.spec.shapes.shift_remove(name.as_ref());
        }

        removed
    }

    /// Writes the raw document as pretty JSON (2-space indent)
    ///
    /// Writes to a temp file first and renames it into place.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, &self.raw)
                .context("Failed to serialize document")?;
            writer.flush().context("Failed to flush document")?;
        }

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        tracing::debug!(path = %path.display(), "Wrote document");
        Ok(())
    }
}

/// Parses JSON text whose root must be an object
fn parse_object(path: &Path, content: &str) -> Result<Value> {
    let raw: Value = serde_json::from_str(content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;

    if !raw.is_object() {
        return Err(SpecFileError::NotAnObject(path.to_path_buf()).into());
    }
    Ok(raw)
}

fn typed<T: serde::de::DeserializeOwned>(path: &Path, raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| {
        SpecFileError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
        .into()
    })
}
