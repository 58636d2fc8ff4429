//! Record formatter transformer
//!
//! Renders accounting records as JSON objects for a given record version.

use crate::etl::Transformer;
use crate::record::{CloudRecord, RecordVersion};
use eyre::Result;
use serde_json::Value;

/// Transformer from [`CloudRecord`] to the flat JSON object of one record version
///
/// # Example
/// ```
/// use usage_extractor::etl::Transformer;
/// use usage_extractor::record::{CloudRecord, RecordVersion};
/// use usage_extractor::transform::RecordFormatter;
///
/// let record = CloudRecord::new("vm-1", "SITE", "web", None, "project", "vo");
/// let output = RecordFormatter::new(RecordVersion::V02).transform(record).unwrap();
/// assert_eq!(output["VMUUID"], "vm-1");
/// assert!(output.get("PublicIPCount").is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormatter {
    version: RecordVersion,
}

impl RecordFormatter {
    pub fn new(version: RecordVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> RecordVersion {
        self.version
    }
}

impl Transformer for RecordFormatter {
    type Input = CloudRecord;
    type Output = Value;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        Ok(Value::Object(input.as_dict(self.version)))
    }
}
