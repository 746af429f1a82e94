//! Geofence data types.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;

/// Callback invoked on a geofence transition.
pub type GeofenceCallback = Rc<dyn Fn(&GeofenceRegion)>;

/// The monitorable part of a geofence, as forwarded to the native layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceRegion {
    /// Unique key of this geofence.
    pub identifier: String,

    /// Center of the circular region.
    pub coords: Coordinates,

    /// Radius in meters.
    pub radius: f64,

    /// Remove the geofence automatically after the first exit.
    #[serde(default)]
    pub expire_on_exit: bool,
}

/// How identifiers are generated for geofences registered without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierStrategy {
    /// `_` followed by a random number below 999,999,999.
    #[default]
    Random,
    /// `_` followed by a per-registry counter (`_0`, `_1`, ...).
    Sequential,
}

/// A geofence to register.
///
/// # Example
///
/// ```
/// use geowatch_core::geofence::GeofenceDefinition;
/// use geowatch_core::location::Coordinates;
///
/// let home = GeofenceDefinition::new(Coordinates::new(37.0, -122.0), 100.0)
///     .with_identifier("home")
///     .on_did_exit(|region| println!("left {}", region.identifier))
///     .expire_on_exit(true);
///
/// assert_eq!(home.identifier(), Some("home"));
/// ```
#[derive(Clone)]
pub struct GeofenceDefinition {
    pub(crate) identifier: Option<String>,
    pub(crate) coords: Coordinates,
    pub(crate) radius: f64,
    pub(crate) on_did_enter: Option<GeofenceCallback>,
    pub(crate) on_did_exit: Option<GeofenceCallback>,
    pub(crate) expire_on_exit: bool,
}

impl GeofenceDefinition {
    /// Creates a definition centered on `coords` with `radius` meters.
    #[must_use]
    pub const fn new(coords: Coordinates, radius: f64) -> Self {
        Self {
            identifier: None,
            coords,
            radius,
            on_did_enter: None,
            on_did_exit: None,
            expire_on_exit: false,
        }
    }

    /// Sets the identifier. An empty identifier counts as absent.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the callback run when the device enters the region.
    #[must_use]
    pub fn on_did_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&GeofenceRegion) + 'static,
    {
        self.on_did_enter = Some(Rc::new(callback));
        self
    }

    /// Sets the callback run when the device leaves the region.
    #[must_use]
    pub fn on_did_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&GeofenceRegion) + 'static,
    {
        self.on_did_exit = Some(Rc::new(callback));
        self
    }

    /// Removes the geofence after its first exit event.
    #[must_use]
    pub fn expire_on_exit(mut self, expire: bool) -> Self {
        self.expire_on_exit = expire;
        self
    }

    /// The caller-supplied identifier, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Center of the region.
    #[must_use]
    pub const fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// Radius in meters.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Checks that the region can be monitored.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the center is not a valid
    /// coordinate or the radius is not a positive finite number.
    pub fn validate(&self) -> Result<(), String> {
        if !self.coords.is_valid() {
            return Err(format!(
                "center ({}, {}) is not a valid coordinate",
                self.coords.latitude, self.coords.longitude
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(format!(
                "radius must be a positive finite number of meters, got {}",
                self.radius
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GeofenceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceDefinition")
            .field("identifier", &self.identifier)
            .field("coords", &self.coords)
            .field("radius", &self.radius)
            .field("on_did_enter", &self.on_did_enter.is_some())
            .field("on_did_exit", &self.on_did_exit.is_some())
            .field("expire_on_exit", &self.expire_on_exit)
            .finish()
    }
}
