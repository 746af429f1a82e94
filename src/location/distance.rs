//! Great-circle distance between coordinates.

use super::types::Coordinates;

/// Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Computes the great-circle surface distance between two points in meters.
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
/// Only latitude and longitude are considered; altitude is ignored.
///
/// # Examples
///
/// ```
/// use geowatch_core::location::{distance_between, Coordinates};
///
/// let a = Coordinates::new(37.0, -122.0);
/// assert_eq!(distance_between(&a, &a), 0.0);
///
/// let b = Coordinates::new(37.001, -122.0);
/// let d = distance_between(&a, &b);
/// assert!((d - 111.3).abs() < 1.0);
/// ```
#[must_use]
pub fn distance_between(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}
