//! Geofence registry.
//!
//! A geofence is a named circular region with optional enter/exit callbacks.
//! The native layer does the actual monitoring; this module keeps the
//! definitions, routes native transition events to the right callbacks and
//! answers point-in-region queries locally.
//!
//! # Architecture
//!
//! ```text
//! GeofenceRegistry
//!     ├── HashMap<identifier, definition>
//!     ├── NativeLocationModule (set/remove/clear/monitoredRegions)
//!     └── DeviceEventEmitter (geofenceEntered/geofenceExited dispatch)
//! ```
//!
//! # Types
//!
//! - [`GeofenceDefinition`]: builder for a geofence to register
//! - [`GeofenceRegion`]: the serialisable part sent to the native layer
//! - [`IdentifierStrategy`]: how missing identifiers are generated

mod error;
mod registry;
pub mod types;

pub use error::{GeofenceError, Result};
pub use registry::GeofenceRegistry;
pub use types::{GeofenceCallback, GeofenceDefinition, GeofenceRegion, IdentifierStrategy};
