//! Extractor trait for per-project usage retrieval

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::Result;
use std::collections::BTreeMap;

/// Records keyed by their identifier
pub type Records<R> = BTreeMap<String, R>;

/// Extractor trait for retrieving the usage records of one project
///
/// Implementors talk to a specific backend (one per resource type) and
/// return every record that falls in the half-open window `[from, to)`.
/// The trait is object safe so that backends can be selected by name at
/// runtime through an [`ExtractorRegistry`](super::ExtractorRegistry).
///
/// # Example
/// ```no_run
/// use async_trait::async_trait;
/// use chrono::NaiveDateTime;
/// use eyre::Result;
/// use usage_extractor::etl::{Extractor, Records};
///
/// struct StaticExtractor;
///
/// #[async_trait]
/// impl Extractor for StaticExtractor {
///     type Record = u64;
///
///     async fn extract_for_project(
///         &self,
///         project: &str,
///         _from: NaiveDateTime,
///         _to: NaiveDateTime,
///     ) -> Result<Records<Self::Record>> {
///         Ok(Records::from([(format!("{project}-vm"), 42)]))
///     }
/// }
/// ```
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The record payload produced by this backend
    type Record: Send;

    /// Extract the records of `project` for the window `[from, to)`
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, authorization, decoding, etc.)
    async fn extract_for_project(
        &self,
        project: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Records<Self::Record>>;
}
