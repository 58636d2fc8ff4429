//! Publishing of accounting records as NDJSON

use super::ndjson::{NdjsonWriter, to_ndjson};
use crate::etl::{Loader, Transformer};
use crate::record::CloudRecord;
use crate::transform::RecordFormatter;
use eyre::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Loader that renders records in one record version and writes them as
/// NDJSON, either appended to a file or to standard output
pub struct RecordWriter {
    formatter: RecordFormatter,
    output: Option<NdjsonWriter>,
}

impl RecordWriter {
    /// Write records to standard output
    pub fn stdout(formatter: RecordFormatter) -> Self {
        Self {
            formatter,
            output: None,
        }
    }

    /// Append records to the NDJSON file at `path`
    pub fn file(formatter: RecordFormatter, path: impl AsRef<Path>) -> Self {
        Self {
            formatter,
            output: Some(NdjsonWriter::new(path)),
        }
    }

    /// Destination description for log messages
    pub fn destination(&self) -> String {
        match &self.output {
            Some(writer) => writer.path().display().to_string(),
            None => "stdout".to_string(),
        }
    }
}

impl Loader for RecordWriter {
    type Item = CloudRecord;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let values = self.formatter.transform_many(items)?;

        let count = match &self.output {
            Some(writer) => writer.load(values).await?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(to_ndjson(&values)?.as_bytes())
                    .wrap_err("Failed to write records to stdout")?;
                values.len()
            }
        };

        log::debug!(
            "Wrote {} record(s) as version {} to {}",
            count,
            self.formatter.version(),
            self.destination()
        );
        Ok(count)
    }
}
