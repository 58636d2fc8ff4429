//! File system storage operations
//!
//! This module handles all file I/O operations including:
//! - Last run timestamps per project
//! - NDJSON file appends
//! - Record publishing as NDJSON

mod lastrun;
mod ndjson;
mod record_writer;

pub use lastrun::{FileLastRunStore, LastRunStore, MemoryLastRunStore};
pub use ndjson::{NdjsonWriter, to_ndjson};
pub use record_writer::RecordWriter;
