//! Usage Extractor
//!
//! Batch extraction of cloud usage accounting records: for each configured
//! project, a window since the last successful run is handed to a pluggable
//! backend and the resulting records are merged and published.

pub mod cli;
pub mod client;
pub mod clock;
pub mod compute;
pub mod config;
pub mod dates;
pub mod error;
pub mod etl;
pub mod record;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::ExtractError;
pub use etl::{Extractor, ExtractorRegistry, Loader, Manager, Records, Transformer};
pub use record::{CloudRecord, RecordVersion};
pub use storage::{FileLastRunStore, LastRunStore, MemoryLastRunStore, NdjsonWriter};
