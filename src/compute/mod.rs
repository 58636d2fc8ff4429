//! Compute usage backend
//!
//! Extracts one accounting record per virtual machine from the compute
//! API's simple tenant usage report. Registered under the name `nova`.

mod extractor;
mod usage;

pub use extractor::{ComputeSettings, ComputeUsageExtractor, NAME};
pub use usage::{ServerUsage, TenantUsage, vm_status};
