//! Core extraction abstractions
//!
//! This module provides the [`Extractor`] interface implemented by usage
//! backends, the [`ExtractorRegistry`] that selects one by name, and the
//! [`Manager`] that drives a run over the configured projects. Extracted
//! records are published through a [`Loader`], optionally after a
//! [`Transformer`] step.

mod extract;
mod load;
mod manager;
mod registry;
mod transform;

pub use extract::{Extractor, Records};
pub use load::Loader;
pub use manager::Manager;
pub use registry::{BoxedExtractor, ExtractorRegistry};
pub use transform::Transformer;
