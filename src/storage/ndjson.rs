//! NDJSON (Newline Delimited JSON) file operations

use crate::etl::Loader;

use eyre::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Write NDJSON to a file
pub struct NdjsonWriter {
    path: std::path::PathBuf,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append items to existing NDJSON file
    pub fn append(&self, items: &[Value]) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open NDJSON file: {}", self.path.display()))?;

        for item in items {
            writeln!(file, "{}", serde_json::to_string(item)?)?;
        }

        Ok(())
    }
}

/// Render values one per line, with a trailing newline when non-empty
pub fn to_ndjson(items: &[Value]) -> Result<String> {
    let ndjson = items
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");

    Ok(if ndjson.is_empty() {
        String::new()
    } else {
        format!("{}\n", ndjson)
    })
}

// Appending keeps the output of earlier runs when the same file is reused

impl Loader for NdjsonWriter {
    type Item = Value;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.append(&items)?;
        Ok(items.len())
    }
}
