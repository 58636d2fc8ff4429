//! Typed failures raised by the extraction core
//!
//! These travel inside `eyre::Report` like every other error in the crate;
//! callers that need to tell them apart use `report.downcast_ref::<ExtractError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The configured extractor name has no registered factory
    #[error("Unknown extractor '{name}'. Available extractors: {available}")]
    UnknownExtractor { name: String, available: String },

    /// A configured date option could not be parsed
    #[error("Invalid date '{value}' for {field}")]
    InvalidDate { field: String, value: String },

    /// The persisted last run timestamp of a project could not be parsed
    #[error("Invalid date '{value}' found in last run file for project '{project}'")]
    InvalidLastRun { project: String, value: String },

    /// Requested accounting record version does not exist
    #[error("Record version '{0}' not found. Supported versions: 0.2, 0.4")]
    RecordVersionNotFound(String),
}

impl ExtractError {
    /// True for the value-error class: any unparsable date, whatever its origin
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, Self::InvalidDate { .. } | Self::InvalidLastRun { .. })
    }
}
