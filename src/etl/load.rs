//! Loader trait for publishing extracted records

use eyre::Result;

/// Loader trait for handing records to a destination
///
/// The manager calls the loader once per run with every record extracted
/// across all projects. Implementors decide where the records go: a file,
/// standard output, a message queue.
///
/// # Example
/// ```no_run
/// use usage_extractor::etl::Loader;
/// use eyre::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = String;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load items to the destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if loading fails (I/O, serialization, etc.)
    fn load(
        &self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
