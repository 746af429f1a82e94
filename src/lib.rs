//! GeoWatch Core Library
//!
//! Position watches and a geofence registry layered over a platform's native
//! location module. Positioning, permission prompts and geofence triggering
//! happen natively; this crate keeps the subscription and geofence
//! bookkeeping and routes native events to the right callbacks.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod events;
pub mod geofence;
pub mod location;
pub mod logging;
pub mod native;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod watch;

pub use api::LocationServices;
pub use config::LocationServicesConfig;
pub use watch::WatchId;
