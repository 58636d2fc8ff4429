//! Name to extractor factory lookup

use super::Extractor;
use crate::error::ExtractError;
use eyre::Result;
use std::collections::BTreeMap;

/// A boxed extractor producing records of type `R`
pub type BoxedExtractor<R> = Box<dyn Extractor<Record = R>>;

type Factory<R> = Box<dyn Fn() -> Result<BoxedExtractor<R>> + Send + Sync>;

/// Set of extractor backends that can be selected by name.
///
/// The registry is an explicit value handed to the
/// [`Manager`](super::Manager); there is no process wide table. Factories
/// run only when their backend is selected, so a backend whose credentials
/// are missing does not prevent another one from being used.
pub struct ExtractorRegistry<R> {
    factories: BTreeMap<String, Factory<R>>,
}

impl<R> Default for ExtractorRegistry<R> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<R> ExtractorRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<BoxedExtractor<R>> + Send + Sync + 'static,
    {
        let name = name.into();
        log::trace!("Registering extractor '{}'", name);
        self.factories.insert(name, Box::new(factory));
        self
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the extractor registered under `name`
    ///
    /// # Errors
    /// [`ExtractError::UnknownExtractor`] when nothing is registered under
    /// `name`, or whatever the factory itself fails with.
    pub fn create(&self, name: &str) -> Result<BoxedExtractor<R>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ExtractError::UnknownExtractor {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
        log::debug!("Creating extractor '{}'", name);
        factory()
    }
}
