//! Event transport between the native location module and the registries.
//!
//! The native layer pushes [`NativeEvent`]s into a [`DeviceEventEmitter`];
//! watches and the geofence dispatcher consume them through listeners. Each
//! listener registration is represented by a [`Subscription`] that the
//! owner releases when it no longer wants events.
//!
//! # Event Streams
//!
//! | Kind | Payload | Consumer |
//! |------|---------|----------|
//! | `positionChanged` | [`Position`](crate::location::Position) | watch success handlers |
//! | `positionError` | [`PositionError`](crate::location::PositionError) | watch error handlers |
//! | `geofenceEntered` | [`GeofenceEvent`] | geofence enter dispatch |
//! | `geofenceExited` | [`GeofenceEvent`] | geofence exit dispatch |

mod emitter;
pub mod types;

pub use emitter::{DeviceEventEmitter, Subscription};
pub use types::{EventKind, GeofenceEvent, NativeEvent};
