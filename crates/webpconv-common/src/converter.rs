//! The [`Converter`] trait every backend implements, and the outcome
//! classification the fallback orchestrator applies to its result.

use std::path::Path;

use crate::{ConversionOptions, Error, Result};

/// A backend capable of producing a WebP file from a JPEG or PNG source.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Converter: Send + Sync {
    /// Identifier used to select this converter in a converter list.
    fn id(&self) -> &str;

    /// Convert `source` into a WebP image at `destination`.
    ///
    /// On `Ok(())` the destination file exists. Failures should be reported
    /// as [`Error::NotOperational`], [`Error::Declined`] or
    /// [`Error::Failed`]; any other error aborts the whole conversion.
    fn convert(
        &self,
        source: &Path,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<()>;
}

/// Classified result of a single converter invocation.
#[derive(Debug)]
pub enum ConverterOutcome {
    /// The destination was written.
    Success,
    /// The converter refused the request by its own policy.
    Declined(Error),
    /// The converter cannot run in this environment.
    NotOperational(Error),
    /// The converter tried and failed.
    Failed(Error),
}

impl ConverterOutcome {
    /// Classify a converter result.
    ///
    /// Errors outside the fallback taxonomy are handed back as `Err` so the
    /// caller can propagate them immediately.
    pub fn classify(result: Result<()>) -> Result<Self> {
        match result {
            Ok(()) => Ok(Self::Success),
            Err(err @ Error::Declined { .. }) => Ok(Self::Declined(err)),
            Err(err @ Error::NotOperational { .. }) => Ok(Self::NotOperational(err)),
            Err(err @ Error::Failed { .. }) => Ok(Self::Failed(err)),
            Err(other) => Err(other),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Declined(_) => "declined",
            Self::NotOperational(_) => "not-operational",
            Self::Failed(_) => "failed",
        }
    }
}
