//! Extraction manager
//!
//! Resolves one extractor for the whole run, computes a `[from, to)` window
//! per project and merges every project's records into one mapping.

use super::registry::{BoxedExtractor, ExtractorRegistry};
use super::{Loader, Records};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::dates::{epoch, format_timestamp, parse_timestamp};
use crate::error::ExtractError;
use crate::storage::{FileLastRunStore, LastRunStore};
use chrono::NaiveDateTime;
use eyre::Result;

/// Coordinates one extraction run over the configured projects
///
/// Projects are processed sequentially. Any failure, be it an unparsable
/// date or an extractor error, aborts the whole run and the records
/// gathered so far are dropped.
///
/// # Example
/// ```no_run
/// use usage_extractor::config::Config;
/// use usage_extractor::etl::{ExtractorRegistry, Manager};
///
/// # async fn example(registry: ExtractorRegistry<()>) -> eyre::Result<()> {
/// let config = Config::default()
///     .with_extractor("nova")
///     .with_projects(["research"])
///     .with_extract_to("2015-12-19");
/// let manager = Manager::new(config, &registry)?;
/// let records = manager.get_records().await?;
/// # Ok(())
/// # }
/// ```
pub struct Manager<R> {
    config: Config,
    extractor: BoxedExtractor<R>,
    store: Box<dyn LastRunStore>,
    clock: Box<dyn Clock>,
}

impl<R: Send> Manager<R> {
    /// Build a manager, resolving the configured extractor in `registry`
    ///
    /// Last run files live under `config.spooldir` and the window end
    /// defaults to the system clock; see [`with_store`](Self::with_store)
    /// and [`with_clock`](Self::with_clock) to replace either.
    ///
    /// # Errors
    /// [`ExtractError::UnknownExtractor`] if no extractor is registered under
    /// `config.extractor`, or the extractor factory's own error.
    pub fn new(config: Config, registry: &ExtractorRegistry<R>) -> Result<Self> {
        let extractor = registry.create(&config.extractor)?;
        let store = FileLastRunStore::new(&config.spooldir);

        Ok(Self {
            config,
            extractor,
            store: Box::new(store),
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the last run persistence
    pub fn with_store(mut self, store: impl LastRunStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Replace the clock used when no window end is configured
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the records of every configured project
    ///
    /// The window end is `extract_to` (or now). The window start is
    /// `extract_from` when set, otherwise the project's last run. Both
    /// configured bounds are validated before the first extractor call, so
    /// an invalid `extract_to` fails even with no projects configured.
    ///
    /// # Errors
    /// - [`ExtractError::InvalidDate`] for an unparsable `extract_from`/`extract_to`
    /// - [`ExtractError::InvalidLastRun`] for a malformed last run value
    /// - any extractor failure, unchanged
    pub async fn get_records(&self) -> Result<Records<R>> {
        let (records, _) = self.extract().await?;
        Ok(records)
    }

    /// Start of the next window for `project`
    ///
    /// The epoch origin when the project has no last run value.
    ///
    /// # Errors
    /// [`ExtractError::InvalidLastRun`] when the stored value is not a date.
    pub fn lastrun(&self, project: &str) -> Result<NaiveDateTime> {
        let Some(value) = self.store.read(project)? else {
            log::debug!("No previous run for project '{}'", project);
            return Ok(epoch());
        };

        parse_timestamp(&value).ok_or_else(|| {
            ExtractError::InvalidLastRun {
                project: project.to_string(),
                value: value.trim().to_string(),
            }
            .into()
        })
    }

    /// Record `timestamp` as the last run of `project`
    pub fn write_lastrun(&self, project: &str, timestamp: NaiveDateTime) -> Result<()> {
        self.store.write(project, &format_timestamp(&timestamp))
    }

    /// Extract, hand the records to `loader`, then mark every project done
    ///
    /// Projects are marked done with the window end only after the loader
    /// succeeded, and never in dry-run mode.
    ///
    /// Returns the number of records loaded.
    pub async fn run<L>(&self, loader: &L) -> Result<usize>
    where
        L: Loader<Item = R>,
    {
        let (records, to) = self.extract().await?;
        let count = loader.load(records.into_values().collect()).await?;

        if self.config.dry_run {
            log::warn!("Dry run: last run timestamps not updated");
            return Ok(count);
        }

        for project in &self.config.projects {
            self.write_lastrun(project, to)?;
        }
        log::debug!(
            "Marked {} project(s) done at {}",
            self.config.projects.len(),
            to
        );

        Ok(count)
    }

    async fn extract(&self) -> Result<(Records<R>, NaiveDateTime)> {
        let to = match &self.config.extract_to {
            Some(value) => parse_config_date("extract_to", value)?,
            None => self.clock.now(),
        };
        let from = self
            .config
            .extract_from
            .as_deref()
            .map(|value| parse_config_date("extract_from", value))
            .transpose()?;

        let mut records = Records::new();
        if self.config.projects.is_empty() {
            log::info!("No projects configured, nothing to extract");
            return Ok((records, to));
        }

        for project in &self.config.projects {
            let from = match from {
                Some(from) => from,
                None => self.lastrun(project)?,
            };

            log::info!(
                "Extracting records for project '{}' from {} to {}",
                project,
                from,
                to
            );
            let extracted = self
                .extractor
                .extract_for_project(project, from, to)
                .await?;
            log::info!(
                "Extracted {} record(s) for project '{}'",
                extracted.len(),
                project
            );

            records.extend(extracted);
        }

        log::info!(
            "Extracted {} record(s) across {} project(s)",
            records.len(),
            self.config.projects.len()
        );
        Ok((records, to))
    }
}

fn parse_config_date(field: &str, value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| {
        ExtractError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}
