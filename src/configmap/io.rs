//! Loading and persisting values documents.
//!
//! Loading runs the text through a real YAML parse first: the section codec
//! only ever edits documents that a parser accepts, and only when the root
//! is a mapping whose `configmap` value (if present) is a mapping or null.
//! Saving re-parses the rendered text the same way before any bytes reach
//! disk, then writes atomically.

use crate::configmap::section::{self, ParsedDocument};
use crate::error::{PropmapError, Result};
use crate::fs::atomic_write_file;
use std::path::Path;

/// A values document with its configmap section parsed for editing.
#[derive(Debug, Clone)]
pub struct ValuesDocument {
    pub(crate) parsed: ParsedDocument,
}

impl ValuesDocument {
    /// Load a values document from disk.
    ///
    /// # Errors
    ///
    /// Returns `PropmapError::DocumentError` when the file cannot be read,
    /// is not valid YAML, has a non-mapping root, or carries a configmap
    /// this codec refuses to edit.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PropmapError::DocumentError(format!(
                "failed to read values file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let content = raw.replace("\r\n", "\n");
        validate_shape(&content, path)?;
        let parsed = section::parse_document(&content).map_err(|e| with_path(e, path))?;
        Ok(Self { parsed })
    }

    /// Render the document to text. Lines the merge did not touch come out
    /// byte-identical.
    pub fn render(&self) -> String {
        self.parsed.render()
    }

    /// Validate the rendered document and write it atomically.
    ///
    /// # Errors
    ///
    /// Returns `PropmapError::DocumentError` when the rendered text fails
    /// the re-parse, leaving the output untouched, and
    /// `PropmapError::WriteError` when the write itself fails.
    pub fn save<P: AsRef<Path>>(&self, output: P) -> Result<()> {
        let output = output.as_ref();
        let rendered = self.render();
        self_check(&rendered, output)?;
        atomic_write_file(output, &rendered)
    }
}

/// Shape gate for loaded documents.
fn validate_shape(content: &str, path: &Path) -> Result<()> {
    let root: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
        PropmapError::DocumentError(format!("failed to parse '{}': {}", path.display(), e))
    })?;
    if !root.is_mapping() {
        return Err(PropmapError::DocumentError(format!(
            "'{}' must contain a top-level mapping",
            path.display()
        )));
    }
    if let Some(value) = root.get("configmap")
        && !value.is_mapping()
        && !value.is_null()
    {
        return Err(PropmapError::DocumentError(format!(
            "'configmap' in '{}' must be a mapping",
            path.display()
        )));
    }
    Ok(())
}

/// Last gate before any write: the text we are about to persist must parse
/// back with the expected shape.
fn self_check(rendered: &str, output: &Path) -> Result<()> {
    let root: serde_yaml::Value = serde_yaml::from_str(rendered).map_err(|e| {
        PropmapError::DocumentError(format!(
            "refusing to write '{}': rendered document is not valid YAML: {}",
            output.display(),
            e
        ))
    })?;
    if !root.is_mapping() {
        return Err(PropmapError::DocumentError(format!(
            "refusing to write '{}': rendered document lost its top-level mapping",
            output.display()
        )));
    }
    Ok(())
}

fn with_path(err: PropmapError, path: &Path) -> PropmapError {
    match err {
        PropmapError::DocumentError(msg) => {
            PropmapError::DocumentError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}
