//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for converting items between pipeline stages
///
/// Used between extraction and publishing, e.g. to render accounting
/// records in a given record version.
///
/// # Example
/// ```no_run
/// use usage_extractor::etl::Transformer;
/// use eyre::Result;
///
/// struct Upper;
///
/// impl Transformer for Upper {
///     type Input = String;
///     type Output = String;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input.to_uppercase())
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items (default batch implementation)
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}
