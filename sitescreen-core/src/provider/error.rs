use thiserror::Error;

/// Errors from [`crate::GeoProvider`] operations.
///
/// Providers do not retry. A failure aborts the request that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not be reached or initialised.
    #[error("geospatial provider unavailable: {reason}")]
    Unavailable {
        /// Why the provider is unavailable.
        reason: String,
    },
    /// A provider call was made but failed.
    #[error("{operation} failed: {message}")]
    RequestFailed {
        /// Provider operation that failed.
        operation: &'static str,
        /// Failure reported by the provider.
        message: String,
    },
    /// The provider does not implement the operation.
    #[error("{operation} is not supported by this provider")]
    Unsupported {
        /// Provider operation that was requested.
        operation: &'static str,
    },
}

impl ProviderError {
    /// Build a [`ProviderError::RequestFailed`] from any displayable cause.
    #[must_use]
    pub fn request_failed(operation: &'static str, cause: &dyn std::fmt::Display) -> Self {
        Self::RequestFailed {
            operation,
            message: cause.to_string(),
        }
    }
}
