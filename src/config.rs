//! Run configuration
//!
//! Options can come from a YAML file and are overridden by command line
//! flags. Example format:
//! ```yaml
//! extractor: nova
//! projects:
//!   - 03b6a6c4-cf2b-48b9-82f1-69c52b9f30af
//!   - research
//! extract_from: 2015-12-01
//! spooldir: /var/spool/usage-extractor
//! dry_run: false
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTRACTOR: &str = "nova";
pub const DEFAULT_SPOOLDIR: &str = "/var/spool/usage-extractor";

/// Options resolved once when the manager is built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Name of the extractor backend to use
    pub extractor: String,
    /// Projects to extract, in order
    pub projects: Vec<String>,
    /// Window start for every project; when unset each project resumes
    /// from its last run
    pub extract_from: Option<String>,
    /// Window end; when unset the current time is used
    pub extract_to: Option<String>,
    /// Extract but never persist last run timestamps
    pub dry_run: bool,
    /// Directory holding the last run files
    pub spooldir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extractor: DEFAULT_EXTRACTOR.to_string(),
            projects: Vec::new(),
            extract_from: None,
            extract_to: None,
            dry_run: false,
            spooldir: PathBuf::from(DEFAULT_SPOOLDIR),
        }
    }
}

impl Config {
    /// Read a configuration from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read configuration: {}",
                path.as_ref().display()
            )
        })?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse configuration YAML")?;

        Ok(config)
    }

    /// Write the configuration as YAML
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .with_context(|| "Failed to serialize configuration")?;

        std::fs::write(path.as_ref(), yaml).with_context(|| {
            format!(
                "Failed to write configuration: {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }

    pub fn with_extractor(mut self, extractor: impl Into<String>) -> Self {
        self.extractor = extractor.into();
        self
    }

    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extract_from(mut self, extract_from: impl Into<String>) -> Self {
        self.extract_from = Some(extract_from.into());
        self
    }

    pub fn with_extract_to(mut self, extract_to: impl Into<String>) -> Self {
        self.extract_to = Some(extract_to.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_spooldir(mut self, spooldir: impl Into<PathBuf>) -> Self {
        self.spooldir = spooldir.into();
        self
    }
}
