//! Error types for requests to the native location module.

use thiserror::Error;

/// Error returned when the native layer refuses to accept a request.
///
/// This covers failures to *issue* a request. Failures of an accepted
/// request (no fix, timeout) arrive later as
/// [`PositionError`](crate::location::PositionError) callbacks or events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The native module is not linked into this build or platform.
    #[error("Native location module not available: {0}")]
    NotAvailable(String),

    /// Location access has not been granted.
    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    /// The native call itself failed.
    #[error("Native {operation} failed: {message}")]
    OperationFailed {
        /// Name of the native operation.
        operation: String,
        /// Platform-provided description.
        message: String,
    },
}

/// Result type alias for native operations.
pub type Result<T> = std::result::Result<T, NativeError>;
