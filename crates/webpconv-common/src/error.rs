//! Error types shared by all converters.
//!
//! The first three variants form the fallback taxonomy the orchestrator
//! understands. Everything else is unclassified and aborts a conversion.

/// Common error type for webpconv.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The environment cannot run this converter at all.
    #[error("{converter} is not operational: {reason}")]
    NotOperational {
        /// Identifier of the converter (or binary) that reported it.
        converter: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The converter is operational but its policy excludes this request.
    #[error("{converter} declined: {reason}")]
    Declined {
        /// Identifier of the converter that declined.
        converter: String,
        /// Human-readable reason.
        reason: String,
    },

    /// An attempt was made and the backend reported failure.
    #[error("{converter} failed: {reason}")]
    Failed {
        /// Identifier of the converter that failed.
        converter: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new NotOperational error.
    pub fn not_operational(converter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotOperational {
            converter: converter.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Declined error.
    pub fn declined(converter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Declined {
            converter: converter.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Failed error.
    pub fn failed(converter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            converter: converter.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// The converter named by a fallback error, if any.
    pub fn converter(&self) -> Option<&str> {
        match self {
            Self::NotOperational { converter, .. }
            | Self::Declined { converter, .. }
            | Self::Failed { converter, .. } => Some(converter),
            _ => None,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
