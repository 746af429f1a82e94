//! Error types for geofence operations.

use thiserror::Error;

use crate::native::NativeError;

/// Error type for geofence operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeofenceError {
    /// No geofence is registered under the identifier.
    #[error("Geofence not found: {0}")]
    NotFound(String),

    /// The definition cannot be monitored (bad center or radius).
    #[error("Invalid geofence: {0}")]
    InvalidRegion(String),

    /// The native layer refused the request.
    #[error(transparent)]
    Native(#[from] NativeError),
}

/// Result type alias for geofence operations.
pub type Result<T> = std::result::Result<T, GeofenceError>;
