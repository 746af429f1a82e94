//! Public facade over the watch and geofence registries.

use std::rc::Rc;

use tracing::error;

use crate::config::{ConfigError, LocationServicesConfig};
use crate::events::DeviceEventEmitter;
use crate::geofence::{self, GeofenceDefinition, GeofenceRegion, GeofenceRegistry};
use crate::location::{Coordinates, Position, PositionError, PositionOptions};
use crate::native::{self, ErrorCallback, NativeLocationModule};
use crate::watch::{WatchErrorHandler, WatchId, WatchRegistry};

/// Entry point for position queries, watches and geofences.
///
/// Owns one watch registry, one geofence registry and the event emitter
/// shared with the native module. Instances are independent of each other.
///
/// All methods take `&self`; callbacks may call back into the same
/// instance (for example clearing a watch from its own success handler).
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use geowatch_core::events::DeviceEventEmitter;
/// use geowatch_core::geofence::{GeofenceDefinition, GeofenceRegion};
/// use geowatch_core::location::{Coordinates, PositionOptions};
/// use geowatch_core::native::{
///     ErrorCallback, NativeLocationModule, PositionCallback, RegionsCallback, Result,
/// };
/// use geowatch_core::LocationServices;
///
/// /// Accepts every request and never reports anything.
/// struct Silent;
///
/// impl NativeLocationModule for Silent {
///     fn get_current_position(
///         &self,
///         _options: &PositionOptions,
///         _on_success: PositionCallback,
///         _on_error: ErrorCallback,
///     ) -> Result<()> {
///         Ok(())
///     }
///     fn start_observing(&self, _options: &PositionOptions) -> Result<()> { Ok(()) }
///     fn stop_observing(&self) -> Result<()> { Ok(()) }
///     fn set_geofence(&self, _region: &GeofenceRegion) -> Result<()> { Ok(()) }
///     fn remove_geofence(&self, _region: &GeofenceRegion) -> Result<()> { Ok(()) }
///     fn clear_all_geofences(&self) -> Result<()> { Ok(()) }
///     fn monitored_regions(&self, callback: RegionsCallback) -> Result<()> {
///         callback(Vec::new());
///         Ok(())
///     }
/// }
///
/// let services = LocationServices::new(Rc::new(Silent), DeviceEventEmitter::new());
///
/// let home = Coordinates::new(37.0, -122.0);
/// let id = services
///     .geofence(GeofenceDefinition::new(home, 100.0).with_identifier("home"))
///     .unwrap();
///
/// assert_eq!(id, "home");
/// assert!(services.is_position_monitored(&home));
///
/// let watch = services.watch_position(|_| {}, None, None).unwrap();
/// assert!(services.is_observing());
/// services.clear_watch(watch);
/// assert!(!services.is_observing());
/// ```
pub struct LocationServices {
    config: LocationServicesConfig,
    native: Rc<dyn NativeLocationModule>,
    emitter: DeviceEventEmitter,
    watches: WatchRegistry,
    geofences: Rc<GeofenceRegistry>,
}

impl LocationServices {
    /// Creates location services with the default configuration.
    ///
    /// `emitter` must be the emitter the native module pushes its events
    /// into.
    #[must_use]
    pub fn new(native: Rc<dyn NativeLocationModule>, emitter: DeviceEventEmitter) -> Self {
        Self::build(native, emitter, LocationServicesConfig::default())
    }

    /// Creates location services with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails
    /// validation.
    pub fn with_config(
        native: Rc<dyn NativeLocationModule>,
        emitter: DeviceEventEmitter,
        config: LocationServicesConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(native, emitter, config))
    }

    fn build(
        native: Rc<dyn NativeLocationModule>,
        emitter: DeviceEventEmitter,
        config: LocationServicesConfig,
    ) -> Self {
        let watches = WatchRegistry::new(Rc::clone(&native), emitter.clone());
        let geofences = GeofenceRegistry::new(
            Rc::clone(&native),
            emitter.clone(),
            config.identifier_strategy,
        );
        Self {
            config,
            native,
            emitter,
            watches,
            geofences,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &LocationServicesConfig {
        &self.config
    }

    /// The emitter shared with the native module.
    #[must_use]
    pub const fn emitter(&self) -> &DeviceEventEmitter {
        &self.emitter
    }

    // ------------------------------------------------------------------
    // Position queries and watches
    // ------------------------------------------------------------------

    /// Requests a single position fix.
    ///
    /// Exactly one of `on_success` / `on_error` runs when the native layer
    /// resolves the request. Without `on_error`, failures are logged at
    /// error level. Omitted options fall back to the configured defaults.
    /// There is no local timeout; use [`PositionOptions::timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the native layer refused to issue the request.
    pub fn get_current_position<F>(
        &self,
        on_success: F,
        on_error: Option<ErrorCallback>,
        options: Option<PositionOptions>,
    ) -> native::Result<()>
    where
        F: FnOnce(Position) + 'static,
    {
        let options = options.unwrap_or_else(|| self.config.default_options.clone());
        let on_error: ErrorCallback = match on_error {
            Some(handler) => handler,
            None => Box::new(log_position_error),
        };
        self.native
            .get_current_position(&options, Box::new(on_success), on_error)
    }

    /// Starts watching the position and returns the watch identifier.
    ///
    /// The native layer is started on the first watch only; later watches
    /// share it and their options are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if native observation could not be started.
    pub fn watch_position<F>(
        &self,
        on_success: F,
        on_error: Option<WatchErrorHandler>,
        options: Option<PositionOptions>,
    ) -> native::Result<WatchId>
    where
        F: Fn(&Position) + 'static,
    {
        let options = options.unwrap_or_else(|| self.config.default_options.clone());
        self.watches.watch(on_success, on_error, &options)
    }

    /// Cancels a watch. Never fails; stale identifiers are ignored.
    pub fn clear_watch(&self, id: WatchId) {
        self.watches.clear(id);
    }

    /// Stops native observation and drops every watch.
    ///
    /// # Errors
    ///
    /// Returns the native error if the stop request was refused; local
    /// state is reset regardless.
    pub fn stop_observing(&self) -> native::Result<()> {
        self.watches.stop()
    }

    /// Returns `true` while native observation is running.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.watches.is_observing()
    }

    /// Number of watches that have not been cleared.
    #[must_use]
    pub fn active_watch_count(&self) -> usize {
        self.watches.active_count()
    }

    // ------------------------------------------------------------------
    // Geofences
    // ------------------------------------------------------------------

    /// Registers a geofence and returns its identifier.
    ///
    /// # Errors
    ///
    /// See [`GeofenceRegistry::add`].
    pub fn geofence(&self, definition: GeofenceDefinition) -> geofence::Result<String> {
        self.geofences.add(definition)
    }

    /// Removes a geofence.
    ///
    /// # Errors
    ///
    /// See [`GeofenceRegistry::remove`].
    pub fn remove_geofence(&self, identifier: &str) -> geofence::Result<()> {
        self.geofences.remove(identifier)
    }

    /// Clears every geofence, natively and locally.
    ///
    /// # Errors
    ///
    /// Returns the native error if the native layer refused.
    pub fn clear_all_geofences(&self) -> native::Result<()> {
        self.geofences.clear_all()
    }

    /// Passes the natively monitored regions to `callback`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be issued.
    pub fn monitored_regions<F>(&self, callback: F) -> native::Result<()>
    where
        F: FnOnce(Vec<GeofenceRegion>) + 'static,
    {
        self.geofences.monitored_regions(callback)
    }

    /// Returns `true` if `coords` lies strictly inside any registered
    /// geofence. Checked locally against the stored definitions.
    #[must_use]
    pub fn is_position_monitored(&self, coords: &Coordinates) -> bool {
        self.geofences.contains_position(coords)
    }

    /// Registration counter (informational).
    #[must_use]
    pub fn geofence_count(&self) -> i64 {
        self.geofences.count()
    }

    /// All locally registered geofences, ordered by identifier.
    #[must_use]
    pub fn registered_geofences(&self) -> Vec<GeofenceRegion> {
        self.geofences.regions()
    }

    /// Returns `true` once geofence event dispatch has been set up.
    #[must_use]
    pub fn is_listening_for_geofence_events(&self) -> bool {
        self.geofences.is_listening()
    }
}

impl std::fmt::Debug for LocationServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationServices")
            .field("config", &self.config)
            .field("watches", &self.watches)
            .field("geofences", &self.geofences)
            .finish_non_exhaustive()
    }
}

fn log_position_error(err: PositionError) {
    error!(code = ?err.code, reason = %err.message, "current position request failed");
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::geofence::IdentifierStrategy;
    use crate::location::PositionErrorCode;
    use crate::testing::{NativeCall, RecordingNative};

    fn services() -> (Rc<RecordingNative>, LocationServices) {
        let emitter = DeviceEventEmitter::new();
        let native = Rc::new(RecordingNative::new(emitter.clone()));
        let services = LocationServices::new(native.clone(), emitter);
        (native, services)
    }

    #[test]
    fn get_current_position_uses_default_options() {
        let emitter = DeviceEventEmitter::new();
        let native = Rc::new(RecordingNative::new(emitter.clone()));
        let config = LocationServicesConfig {
            default_options: PositionOptions {
                timeout: Some(2_000),
                ..Default::default()
            },
            identifier_strategy: IdentifierStrategy::Random,
        };
        let services = LocationServices::with_config(native.clone(), emitter, config).unwrap();

        services.get_current_position(|_| {}, None, None).unwrap();

        assert_eq!(
            native.calls(),
            vec![NativeCall::GetCurrentPosition(PositionOptions {
                timeout: Some(2_000),
                ..Default::default()
            })]
        );
    }

    #[test]
    fn get_current_position_delivers_success() {
        let (native, services) = services();
        let got = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);

        services
            .get_current_position(move |position| *slot.borrow_mut() = Some(position), None, None)
            .unwrap();
        native.resolve_current_position(Position::new(Coordinates::new(1.0, 2.0)));

        assert_eq!(got.borrow().as_ref().unwrap().coords.longitude, 2.0);
    }

    #[test]
    fn get_current_position_delivers_error_to_handler() {
        let (native, services) = services();
        let failed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&failed);

        services
            .get_current_position(
                |_| panic!("unexpected fix"),
                Some(Box::new(move |_: PositionError| flag.set(true))),
                None,
            )
            .unwrap();
        native.reject_current_position(PositionError::new(
            PositionErrorCode::PermissionDenied,
            "denied",
        ));

        assert!(failed.get());
    }

    #[test]
    fn get_current_position_without_handler_logs_error() {
        let (native, services) = services();

        services
            .get_current_position(|_| panic!("unexpected fix"), None, None)
            .unwrap();

        assert!(native.reject_current_position(PositionError::new(
            PositionErrorCode::Timeout,
            "late"
        )));
    }

    #[test]
    fn with_config_rejects_invalid_defaults() {
        let emitter = DeviceEventEmitter::new();
        let native = Rc::new(RecordingNative::new(emitter.clone()));
        let config = LocationServicesConfig {
            default_options: PositionOptions {
                distance_filter: Some(f64::NAN),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(LocationServices::with_config(native, emitter, config).is_err());
    }

    #[test]
    fn watch_can_clear_itself_from_callback() {
        let (native, services) = services();
        let services = Rc::new(services);
        let own_id: Rc<Cell<Option<WatchId>>> = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));

        let handle = Rc::downgrade(&services);
        let id_slot = Rc::clone(&own_id);
        let counter = Rc::clone(&hits);
        let id = services
            .watch_position(
                move |_| {
                    counter.set(counter.get() + 1);
                    if let (Some(services), Some(id)) = (handle.upgrade(), id_slot.get()) {
                        services.clear_watch(id);
                    }
                },
                None,
                None,
            )
            .unwrap();
        own_id.set(Some(id));

        native.emit_position(Position::new(Coordinates::new(0.0, 0.0)));
        native.emit_position(Position::new(Coordinates::new(0.0, 0.0)));

        assert_eq!(hits.get(), 1);
        assert!(!services.is_observing());
        assert_eq!(native.count("stop_observing"), 1);
    }

    #[test]
    fn instances_are_independent() {
        let (native_a, a) = services();
        let (native_b, b) = services();

        a.watch_position(|_| {}, None, None).unwrap();

        assert!(a.is_observing());
        assert!(!b.is_observing());
        assert_eq!(native_a.count("start_observing"), 1);
        assert_eq!(native_b.count("start_observing"), 0);
    }

    #[test]
    fn monitored_regions_forwards_native_result() {
        let (_, services) = services();
        services
            .geofence(
                GeofenceDefinition::new(Coordinates::new(1.0, 1.0), 10.0).with_identifier("a"),
            )
            .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        services
            .monitored_regions(move |regions| *sink.borrow_mut() = regions)
            .unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].identifier, "a");
    }

    #[test]
    fn debug_output_names_facade() {
        let (_, services) = services();
        let debug = format!("{services:?}");
        assert!(debug.contains("LocationServices"));
        assert!(debug.contains("WatchRegistry"));
    }
}
