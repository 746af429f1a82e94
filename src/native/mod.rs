//! Boundary with the platform's native location module.
//!
//! GeoWatch does no positioning of its own. Fixes, permission prompts and
//! geofence triggering all happen behind [`NativeLocationModule`], which each
//! host platform implements (Core Location on iOS, the fused provider on
//! Android, a stub elsewhere).
//!
//! # Calling Convention
//!
//! Every method returns immediately. A returned `Err` means the request could
//! not be issued at all; results of accepted requests arrive later, either
//! through the callback passed in or as events pushed into the shared
//! [`DeviceEventEmitter`](crate::events::DeviceEventEmitter).
//!
//! Implementations may deliver callbacks and events synchronously from
//! inside a call; the registries never hold internal borrows across native
//! calls.

mod error;

pub use error::{NativeError, Result};

use crate::geofence::GeofenceRegion;
use crate::location::{Position, PositionError, PositionOptions};

/// Receives the fix of a one-shot position request.
pub type PositionCallback = Box<dyn FnOnce(Position)>;

/// Receives the failure of a one-shot position request.
pub type ErrorCallback = Box<dyn FnOnce(PositionError)>;

/// Receives the regions the native layer is currently monitoring.
pub type RegionsCallback = Box<dyn FnOnce(Vec<GeofenceRegion>)>;

/// Capability set of the native location module.
///
/// # Example
///
/// ```
/// use geowatch_core::geofence::GeofenceRegion;
/// use geowatch_core::location::PositionOptions;
/// use geowatch_core::native::{
///     ErrorCallback, NativeError, NativeLocationModule, PositionCallback, RegionsCallback,
///     Result,
/// };
///
/// /// A platform without location hardware.
/// struct Unsupported;
///
/// impl NativeLocationModule for Unsupported {
///     fn get_current_position(
///         &self,
///         _options: &PositionOptions,
///         _on_success: PositionCallback,
///         _on_error: ErrorCallback,
///     ) -> Result<()> {
///         Err(NativeError::NotAvailable("no GPS".into()))
///     }
///     fn start_observing(&self, _options: &PositionOptions) -> Result<()> {
///         Err(NativeError::NotAvailable("no GPS".into()))
///     }
///     fn stop_observing(&self) -> Result<()> { Ok(()) }
///     fn set_geofence(&self, _region: &GeofenceRegion) -> Result<()> {
///         Err(NativeError::NotAvailable("no geofencing".into()))
///     }
///     fn remove_geofence(&self, _region: &GeofenceRegion) -> Result<()> { Ok(()) }
///     fn clear_all_geofences(&self) -> Result<()> { Ok(()) }
///     fn monitored_regions(&self, callback: RegionsCallback) -> Result<()> {
///         callback(Vec::new());
///         Ok(())
///     }
/// }
/// ```
pub trait NativeLocationModule {
    /// Requests a single fix. Exactly one of the callbacks is invoked once
    /// the request resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    fn get_current_position(
        &self,
        options: &PositionOptions,
        on_success: PositionCallback,
        on_error: ErrorCallback,
    ) -> Result<()>;

    /// Starts emitting `positionChanged` / `positionError` events.
    ///
    /// # Errors
    ///
    /// Returns an error if observation could not be started.
    fn start_observing(&self, options: &PositionOptions) -> Result<()>;

    /// Stops emitting position events.
    ///
    /// # Errors
    ///
    /// Returns an error if observation could not be stopped.
    fn stop_observing(&self) -> Result<()>;

    /// Begins monitoring `region`; transitions arrive as
    /// `geofenceEntered` / `geofenceExited` events.
    ///
    /// # Errors
    ///
    /// Returns an error if the region could not be registered.
    fn set_geofence(&self, region: &GeofenceRegion) -> Result<()>;

    /// Stops monitoring `region`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region could not be unregistered.
    fn remove_geofence(&self, region: &GeofenceRegion) -> Result<()>;

    /// Stops monitoring every region, including ones left over from a
    /// previous process.
    ///
    /// # Errors
    ///
    /// Returns an error if the native layer could not be cleared.
    fn clear_all_geofences(&self) -> Result<()>;

    /// Queries the regions currently monitored natively.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be issued.
    fn monitored_regions(&self, callback: RegionsCallback) -> Result<()>;
}
