//! Last run persistence
//!
//! Each project keeps one artifact holding the end of its most recent
//! successful extraction. Values are stored as raw text; parsing them is the
//! manager's job so that a malformed artifact surfaces as a date error.

use eyre::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex is valid"));

/// Get/set access to the last run value of a project
pub trait LastRunStore: Send + Sync {
    /// Raw stored value, `None` when the project never completed a run
    fn read(&self, project: &str) -> Result<Option<String>>;

    /// Replace the stored value of `project`
    fn write(&self, project: &str, value: &str) -> Result<()>;
}

/// One file per project under a spool directory
///
/// Files are named `lastrun.{project}` with every character outside
/// `[A-Za-z0-9._-]` replaced by `_`. No locking: concurrent runs against the
/// same spool directory are not supported.
#[derive(Debug, Clone)]
pub struct FileLastRunStore {
    spooldir: PathBuf,
}

impl FileLastRunStore {
    pub fn new(spooldir: impl AsRef<Path>) -> Self {
        Self {
            spooldir: spooldir.as_ref().to_path_buf(),
        }
    }

    pub fn spooldir(&self) -> &Path {
        &self.spooldir
    }

    /// Path of the artifact for `project`
    pub fn path_for(&self, project: &str) -> PathBuf {
        let sanitized = UNSAFE_CHARS.replace_all(project, "_");
        self.spooldir.join(format!("lastrun.{}", sanitized))
    }
}

impl LastRunStore for FileLastRunStore {
    fn read(&self, project: &str) -> Result<Option<String>> {
        let path = self.path_for(project);
        if !path.exists() {
            log::debug!("No last run file at {}", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read last run file: {}", path.display()))?;
        log::debug!("Read last run '{}' from {}", content.trim(), path.display());
        Ok(Some(content))
    }

    fn write(&self, project: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.spooldir).with_context(|| {
            format!(
                "Failed to create spool directory: {}",
                self.spooldir.display()
            )
        })?;

        let path = self.path_for(project);
        std::fs::write(&path, format!("{}\n", value))
            .with_context(|| format!("Failed to write last run file: {}", path.display()))?;
        log::debug!("Wrote last run '{}' to {}", value, path.display());
        Ok(())
    }
}

/// In-memory store; clones share the same values
#[derive(Debug, Clone, Default)]
pub struct MemoryLastRunStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLastRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(project, value)` pairs
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Arc::new(Mutex::new(values)),
        }
    }

    /// Snapshot of every stored value
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }
}

impl LastRunStore for MemoryLastRunStore {
    fn read(&self, project: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| eyre::eyre!("Last run store lock poisoned"))?;
        Ok(values.get(project).cloned())
    }

    fn write(&self, project: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| eyre::eyre!("Last run store lock poisoned"))?;
        values.insert(project.to_string(), value.to_string());
        Ok(())
    }
}
