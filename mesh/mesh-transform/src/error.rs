//! Error types for transformation operations.

use thiserror::Error;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur when building transforms.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    /// A transform component is NaN or infinite.
    #[error("{what} contains non-finite values")]
    NonFinite {
        /// Which component was rejected.
        what: &'static str,
    },
}
