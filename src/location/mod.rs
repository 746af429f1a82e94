//! Location module for GeoWatch.
//!
//! Provides the value types exchanged with the native location module:
//! - [`Coordinates`] and [`Position`] fixes
//! - [`PositionError`] payloads for failed requests
//! - [`PositionOptions`] forwarded to the native layer
//! - [`distance_between`], a haversine great-circle distance in meters
//!
//! # Example Usage
//!
//! ```
//! use geowatch_core::location::{distance_between, Coordinates, Position};
//!
//! let home = Coordinates::new(37.0, -122.0);
//! let fix = Position::new(Coordinates::new(37.0005, -122.0));
//!
//! let meters = distance_between(&fix.coords, &home);
//! assert!(meters < 100.0);
//!
//! // Positions travel to and from the native layer as JSON
//! let json = fix.to_json().unwrap();
//! assert!(json.contains("latitude"));
//! ```

pub mod distance;
pub mod types;

pub use distance::{distance_between, EARTH_RADIUS_KM};
pub use types::{Coordinates, Position, PositionError, PositionErrorCode, PositionOptions};
