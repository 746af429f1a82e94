//! Location data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A geographic coordinate as reported by the native location module.
///
/// Only `latitude` and `longitude` are required. The remaining fields are
/// filled in by the platform when available and are omitted from JSON when
/// absent.
///
/// # Example
///
/// ```
/// use geowatch_core::location::Coordinates;
///
/// let coords = Coordinates::new(37.7749, -122.4194);
/// assert!(coords.is_valid());
/// assert_eq!(coords.accuracy, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees (-90.0 to 90.0)
    pub latitude: f64,

    /// Longitude in degrees (-180.0 to 180.0)
    pub longitude: f64,

    /// Altitude in meters above the WGS84 ellipsoid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Horizontal accuracy radius in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// Vertical accuracy in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_accuracy: Option<f64>,

    /// Heading in degrees clockwise from true north
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,

    /// Ground speed in meters/second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl Coordinates {
    /// Creates coordinates with only latitude and longitude set.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            altitude_accuracy: None,
            heading: None,
            speed: None,
        }
    }

    /// Returns `true` if both components are finite and within range.
    ///
    /// Latitude must be -90.0 to 90.0, longitude must be -180.0 to 180.0.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A position fix delivered by the native layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Where the device was.
    pub coords: Coordinates,

    /// When the fix was taken (UTC, epoch milliseconds on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Creates a position stamped with the current time.
    #[must_use]
    pub fn new(coords: Coordinates) -> Self {
        Self {
            coords,
            timestamp: Utc::now(),
        }
    }

    /// Creates a position with an explicit timestamp.
    #[must_use]
    pub const fn at(coords: Coordinates, timestamp: DateTime<Utc>) -> Self {
        Self { coords, timestamp }
    }

    /// Creates a `Position` from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or missing required fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Converts this `Position` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (extremely rare).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reason a position request or watch failed on the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionErrorCode {
    /// The user or the platform refused location access.
    PermissionDenied,
    /// No fix could be obtained.
    PositionUnavailable,
    /// The configured timeout elapsed before a fix arrived.
    Timeout,
}

impl std::fmt::Display for PositionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Error payload delivered through error callbacks and `positionError` events.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct PositionError {
    /// Failure category.
    pub code: PositionErrorCode,

    /// Platform-provided description.
    pub message: String,
}

impl PositionError {
    /// Creates a new position error.
    #[must_use]
    pub fn new(code: PositionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Options forwarded to the native layer for one-shot requests and watches.
///
/// Every field is optional; the default is an empty configuration and the
/// native module applies its own defaults. Timeouts are enforced natively,
/// never locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOptions {
    /// Ask for GPS-grade accuracy at higher power cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_high_accuracy: Option<bool>,

    /// Maximum time in milliseconds the native layer may take for a fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Maximum age in milliseconds of a cached fix that may be returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_age: Option<u64>,

    /// Minimum distance in meters between reported watch updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_filter: Option<f64>,
}

impl PositionOptions {
    /// Checks that the options can be handed to the native layer.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(filter) = self.distance_filter {
            if !filter.is_finite() || filter < 0.0 {
                return Err(format!(
                    "distance_filter must be a non-negative finite number, got {filter}"
                ));
            }
        }
        Ok(())
    }
}
