//! Event types carried from the native layer to registered listeners.

use serde::{Deserialize, Serialize};

use crate::location::{Position, PositionError};

/// Name of an event stream produced by the native location module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// A watched position changed.
    PositionChanged,
    /// A watch reported an error.
    PositionError,
    /// The device entered a monitored geofence.
    GeofenceEntered,
    /// The device left a monitored geofence.
    GeofenceExited,
}

impl EventKind {
    /// Returns the wire name of this event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PositionChanged => "positionChanged",
            Self::PositionError => "positionError",
            Self::GeofenceEntered => "geofenceEntered",
            Self::GeofenceExited => "geofenceExited",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a geofence transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeofenceEvent {
    /// Identifier of the geofence the device crossed.
    pub identifier: String,
}

/// An event emitted by the native layer.
///
/// On the wire an event is an object tagged with its name:
///
/// ```json
/// {"event": "geofenceExited", "body": {"identifier": "home"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "body", rename_all = "camelCase")]
pub enum NativeEvent {
    /// A new fix for active watches.
    PositionChanged(Position),
    /// A failure for active watches.
    PositionError(PositionError),
    /// Entered the named geofence.
    GeofenceEntered(GeofenceEvent),
    /// Exited the named geofence.
    GeofenceExited(GeofenceEvent),
}

impl NativeEvent {
    /// Creates a `geofenceEntered` event.
    #[must_use]
    pub fn geofence_entered(identifier: impl Into<String>) -> Self {
        Self::GeofenceEntered(GeofenceEvent {
            identifier: identifier.into(),
        })
    }

    /// Creates a `geofenceExited` event.
    #[must_use]
    pub fn geofence_exited(identifier: impl Into<String>) -> Self {
        Self::GeofenceExited(GeofenceEvent {
            identifier: identifier.into(),
        })
    }

    /// Returns the stream this event belongs to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PositionChanged(_) => EventKind::PositionChanged,
            Self::PositionError(_) => EventKind::PositionError,
            Self::GeofenceEntered(_) => EventKind::GeofenceEntered,
            Self::GeofenceExited(_) => EventKind::GeofenceExited,
        }
    }

    /// Parses an event pushed by a host bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown event.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
