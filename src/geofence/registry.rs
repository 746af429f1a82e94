//! Geofence registry and enter/exit dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use rand::Rng;
use tracing::{debug, warn};

use super::error::{GeofenceError, Result};
use super::types::{GeofenceCallback, GeofenceDefinition, GeofenceRegion, IdentifierStrategy};
use crate::events::{DeviceEventEmitter, EventKind, NativeEvent, Subscription};
use crate::location::{distance_between, Coordinates};
use crate::native::{self, NativeLocationModule};

/// Upper bound (exclusive) for randomly generated identifiers.
const MAX_RANDOM_ID: u64 = 999_999_999;

/// A registered geofence with its transition callbacks.
struct RegisteredGeofence {
    region: GeofenceRegion,
    on_did_enter: Option<GeofenceCallback>,
    on_did_exit: Option<GeofenceCallback>,
}

#[derive(Default)]
struct GeofenceState {
    geofences: HashMap<String, RegisteredGeofence>,
    /// Incremented per registration, decremented per removal.
    geofence_count: i64,
    geofence_id_counter: u64,
    listening: bool,
    /// Enter/exit dispatch listeners, held for the registry's lifetime.
    dispatch: Vec<Subscription>,
}

/// Maps identifiers to geofence definitions and dispatches native
/// `geofenceEntered` / `geofenceExited` events to their callbacks.
///
/// The registry is reference-counted so its dispatch listeners can reach it
/// without keeping it alive.
pub struct GeofenceRegistry {
    native: Rc<dyn NativeLocationModule>,
    emitter: DeviceEventEmitter,
    strategy: IdentifierStrategy,
    this: Weak<Self>,
    state: RefCell<GeofenceState>,
}

impl GeofenceRegistry {
    /// Creates an empty registry.
    ///
    /// No native call is made until the first geofence is registered.
    #[must_use]
    pub fn new(
        native: Rc<dyn NativeLocationModule>,
        emitter: DeviceEventEmitter,
        strategy: IdentifierStrategy,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            native,
            emitter,
            strategy,
            this: this.clone(),
            state: RefCell::new(GeofenceState::default()),
        })
    }

    /// Registers a geofence and starts native monitoring for it.
    ///
    /// The first registration clears any geofences the native layer still
    /// monitors from a previous run and installs the enter/exit dispatch
    /// listeners. Definitions without an identifier (or with an empty one)
    /// receive a generated identifier that is not already registered. A
    /// caller-supplied identifier that is already registered replaces the
    /// previous definition.
    ///
    /// Returns the identifier the geofence was stored under.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::InvalidRegion`] for an invalid center or
    /// radius, or [`GeofenceError::Native`] if the native layer refused the
    /// request. On a native refusal the registry is left as it was.
    pub fn add(&self, definition: GeofenceDefinition) -> Result<String> {
        definition.validate().map_err(GeofenceError::InvalidRegion)?;
        self.listen_for_events()?;

        let GeofenceDefinition {
            identifier,
            coords,
            radius,
            on_did_enter,
            on_did_exit,
            expire_on_exit,
        } = definition;

        let identifier = match identifier.filter(|id| !id.is_empty()) {
            Some(identifier) => identifier,
            None => self.generate_identifier(),
        };
        let region = GeofenceRegion {
            identifier: identifier.clone(),
            coords,
            radius,
            expire_on_exit,
        };

        let replaced = {
            let mut state = self.state.borrow_mut();
            state.geofence_count += 1;
            state.geofences.insert(
                identifier.clone(),
                RegisteredGeofence {
                    region: region.clone(),
                    on_did_enter,
                    on_did_exit,
                },
            )
        };

        if let Err(err) = self.native.set_geofence(&region) {
            let mut state = self.state.borrow_mut();
            state.geofence_count -= 1;
            match replaced {
                Some(previous) => {
                    state.geofences.insert(identifier, previous);
                }
                None => {
                    state.geofences.remove(&identifier);
                }
            }
            return Err(err.into());
        }

        if replaced.is_some() {
            debug!(identifier = %identifier, "replaced existing geofence");
        }
        debug!(identifier = %identifier, radius, "registered geofence");
        Ok(identifier)
    }

    /// Removes a geofence and stops native monitoring for it.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::NotFound`] without contacting the native
    /// layer if `identifier` is not registered, or
    /// [`GeofenceError::Native`] if the native layer refused the removal
    /// (the geofence then stays registered).
    pub fn remove(&self, identifier: &str) -> Result<()> {
        let region = self
            .state
            .borrow()
            .geofences
            .get(identifier)
            .map(|geofence| geofence.region.clone())
            .ok_or_else(|| GeofenceError::NotFound(identifier.to_string()))?;

        self.native.remove_geofence(&region)?;

        let mut state = self.state.borrow_mut();
        if state.geofences.remove(identifier).is_some() {
            state.geofence_count -= 1;
        }
        debug!(identifier, "removed geofence");
        Ok(())
    }

    /// Clears every geofence, natively and locally.
    ///
    /// # Errors
    ///
    /// Returns the native error if the native layer refused; local state is
    /// kept in that case.
    pub fn clear_all(&self) -> native::Result<()> {
        self.native.clear_all_geofences()?;

        let mut state = self.state.borrow_mut();
        let cleared = state.geofences.len();
        state.geofences.clear();
        state.geofence_count = 0;
        debug!(cleared, "cleared all geofences");
        Ok(())
    }

    /// Asks the native layer which regions it is monitoring.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be issued.
    pub fn monitored_regions<F>(&self, callback: F) -> native::Result<()>
    where
        F: FnOnce(Vec<GeofenceRegion>) + 'static,
    {
        self.native.monitored_regions(Box::new(callback))
    }

    /// Returns `true` if `coords` lies strictly inside any registered
    /// geofence, using the locally stored definitions only.
    #[must_use]
    pub fn contains_position(&self, coords: &Coordinates) -> bool {
        self.state.borrow().geofences.values().any(|geofence| {
            distance_between(coords, &geofence.region.coords) < geofence.region.radius
        })
    }

    /// Runs the enter callback of `identifier`.
    ///
    /// Returns `false` and logs a warning if no geofence is registered
    /// under `identifier`.
    pub fn dispatch_enter(&self, identifier: &str) -> bool {
        let Some((region, callback)) =
            self.lookup(identifier, |geofence| geofence.on_did_enter.clone())
        else {
            warn!(identifier, "no geofence registered for enter event");
            return false;
        };

        if let Some(callback) = callback {
            callback(&region);
        }
        true
    }

    /// Runs the exit callback of `identifier`, then removes the geofence if
    /// the definition registered after the callback expires on exit.
    ///
    /// Returns `false` and logs a warning if no geofence is registered
    /// under `identifier`.
    pub fn dispatch_exit(&self, identifier: &str) -> bool {
        let Some((region, callback)) =
            self.lookup(identifier, |geofence| geofence.on_did_exit.clone())
        else {
            warn!(identifier, "no geofence registered for exit event");
            return false;
        };

        if let Some(callback) = callback {
            callback(&region);
        }

        // The callback may have removed or re-registered it.
        let expires = self
            .state
            .borrow()
            .geofences
            .get(identifier)
            .is_some_and(|geofence| geofence.region.expire_on_exit);
        if expires {
            if let Err(err) = self.remove(identifier) {
                warn!(identifier, error = %err, "failed to expire geofence on exit");
            }
        }
        true
    }

    /// Returns the stored region for `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<GeofenceRegion> {
        self.state
            .borrow()
            .geofences
            .get(identifier)
            .map(|geofence| geofence.region.clone())
    }

    /// Returns `true` if a geofence is registered under `identifier`.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.state.borrow().geofences.contains_key(identifier)
    }

    /// All registered regions, ordered by identifier.
    #[must_use]
    pub fn regions(&self) -> Vec<GeofenceRegion> {
        let mut regions: Vec<GeofenceRegion> = self
            .state
            .borrow()
            .geofences
            .values()
            .map(|geofence| geofence.region.clone())
            .collect();
        regions.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        regions
    }

    /// Number of registered geofences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().geofences.len()
    }

    /// Returns `true` if no geofence is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().geofences.is_empty()
    }

    /// Registration counter: +1 per `add`, -1 per removal, reset by
    /// [`clear_all`](Self::clear_all). Replacing an identifier still counts
    /// as a registration, so this can exceed [`len`](Self::len).
    #[must_use]
    pub fn count(&self) -> i64 {
        self.state.borrow().geofence_count
    }

    /// Returns `true` once the dispatch listeners are installed.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state.borrow().listening
    }

    fn lookup<F>(
        &self,
        identifier: &str,
        callback: F,
    ) -> Option<(GeofenceRegion, Option<GeofenceCallback>)>
    where
        F: FnOnce(&RegisteredGeofence) -> Option<GeofenceCallback>,
    {
        self.state
            .borrow()
            .geofences
            .get(identifier)
            .map(|geofence| (geofence.region.clone(), callback(geofence)))
    }

    fn listen_for_events(&self) -> native::Result<()> {
        if self.state.borrow().listening {
            return Ok(());
        }

        // Drop regions left over from a previous process.
        self.native.clear_all_geofences()?;

        let target = self.this.clone();
        let enter = self
            .emitter
            .add_listener(EventKind::GeofenceEntered, move |event| {
                if let (Some(registry), NativeEvent::GeofenceEntered(payload)) =
                    (target.upgrade(), event)
                {
                    registry.dispatch_enter(&payload.identifier);
                }
            });

        let target = self.this.clone();
        let exit = self
            .emitter
            .add_listener(EventKind::GeofenceExited, move |event| {
                if let (Some(registry), NativeEvent::GeofenceExited(payload)) =
                    (target.upgrade(), event)
                {
                    registry.dispatch_exit(&payload.identifier);
                }
            });

        let mut state = self.state.borrow_mut();
        state.listening = true;
        state.dispatch = vec![enter, exit];
        debug!("listening for geofence events");
        Ok(())
    }

    fn generate_identifier(&self) -> String {
        let mut state = self.state.borrow_mut();
        loop {
            let candidate = match self.strategy {
                IdentifierStrategy::Random => {
                    format!("_{}", rand::thread_rng().gen_range(0..MAX_RANDOM_ID))
                }
                IdentifierStrategy::Sequential => {
                    let next = state.geofence_id_counter;
                    state.geofence_id_counter += 1;
                    format!("_{next}")
                }
            };
            if !state.geofences.contains_key(&candidate) {
                return candidate;
            }
            debug!(identifier = %candidate, "generated identifier already registered, retrying");
        }
    }
}

impl std::fmt::Debug for GeofenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("GeofenceRegistry")
            .field("geofences", &state.geofences.len())
            .field("geofence_count", &state.geofence_count)
            .field("listening", &state.listening)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
