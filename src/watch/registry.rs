//! Bookkeeping for `watchPosition` subscriptions.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::events::{DeviceEventEmitter, EventKind, NativeEvent, Subscription};
use crate::location::{Position, PositionError, PositionOptions};
use crate::native::{self, NativeLocationModule};

/// Handler for watch failures.
pub type WatchErrorHandler = Box<dyn Fn(&PositionError)>;

/// Identifier returned by [`WatchRegistry::watch`].
///
/// Equal to the slot the subscription occupies. Slots are never reused
/// until the registry is reset by [`WatchRegistry::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(usize);

impl WatchId {
    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for WatchId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listener pair backing one watch.
struct WatchSubscription {
    success: Subscription,
    error: Subscription,
}

impl WatchSubscription {
    fn release(self) {
        self.success.release();
        self.error.release();
    }
}

fn log_watch_error(watch_id: usize, err: &PositionError) {
    error!(watch_id, code = ?err.code, reason = %err.message, "position watch failed");
}

#[derive(Default)]
struct WatchState {
    /// `None` marks a cleared slot.
    subscriptions: Vec<Option<WatchSubscription>>,
    updates_enabled: bool,
}

/// Tracks active position watches over a single shared native observation.
///
/// The native layer is started by the first watch and stopped once the last
/// one is cleared. All watches share the same `positionChanged` /
/// `positionError` streams.
pub struct WatchRegistry {
    native: Rc<dyn NativeLocationModule>,
    emitter: DeviceEventEmitter,
    state: RefCell<WatchState>,
}

impl WatchRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(native: Rc<dyn NativeLocationModule>, emitter: DeviceEventEmitter) -> Self {
        Self {
            native,
            emitter,
            state: RefCell::new(WatchState::default()),
        }
    }

    /// Registers a watch and returns its identifier.
    ///
    /// Starts native observation with `options` if no watch is active yet.
    /// Otherwise the running observation is shared and `options` is ignored.
    /// Without `on_error`, watch failures are logged at error level.
    ///
    /// # Errors
    ///
    /// Returns an error if native observation could not be started; nothing
    /// is registered in that case.
    pub fn watch<F>(
        &self,
        on_success: F,
        on_error: Option<WatchErrorHandler>,
        options: &PositionOptions,
    ) -> native::Result<WatchId>
    where
        F: Fn(&Position) + 'static,
    {
        if !self.state.borrow().updates_enabled {
            self.native.start_observing(options)?;
            self.state.borrow_mut().updates_enabled = true;
            debug!(?options, "started native position observation");
        }

        let success = self
            .emitter
            .add_listener(EventKind::PositionChanged, move |event| {
                if let NativeEvent::PositionChanged(position) = event {
                    on_success(position);
                }
            });
        let id = WatchId(self.state.borrow().subscriptions.len());
        let handler: WatchErrorHandler = match on_error {
            Some(handler) => handler,
            None => Box::new(move |err: &PositionError| log_watch_error(id.0, err)),
        };
        let error = self
            .emitter
            .add_listener(EventKind::PositionError, move |event| {
                if let NativeEvent::PositionError(err) = event {
                    handler(err);
                }
            });

        let mut state = self.state.borrow_mut();
        state
            .subscriptions
            .push(Some(WatchSubscription { success, error }));
        debug!(watch_id = id.0, "registered position watch");

        Ok(id)
    }

    /// Cancels a watch.
    ///
    /// Unknown or already-cleared identifiers are ignored, the same way
    /// cancelling a stale timer is. Clearing the last live watch stops
    /// native observation.
    pub fn clear(&self, id: WatchId) {
        let Some(subscription) = self
            .state
            .borrow_mut()
            .subscriptions
            .get_mut(id.0)
            .and_then(Option::take)
        else {
            return;
        };
        subscription.release();
        debug!(watch_id = id.0, "cleared position watch");

        let no_watchers = self
            .state
            .borrow()
            .subscriptions
            .iter()
            .all(Option::is_none);
        if no_watchers {
            if let Err(err) = self.stop() {
                warn!(error = %err, "failed to stop native observation after last watch");
            }
        }
    }

    /// Stops native observation and resets the registry.
    ///
    /// Does nothing unless observation is active. Watches that were never
    /// cleared are released with a warning. Local state is reset even if the
    /// native stop request fails.
    ///
    /// # Errors
    ///
    /// Returns the native error if the stop request was refused.
    pub fn stop(&self) -> native::Result<()> {
        if !self.state.borrow().updates_enabled {
            return Ok(());
        }

        let result = self.native.stop_observing();
        let orphaned = {
            let mut state = self.state.borrow_mut();
            state.updates_enabled = false;
            std::mem::take(&mut state.subscriptions)
        };

        for (index, slot) in orphaned.into_iter().enumerate() {
            if let Some(subscription) = slot {
                warn!(
                    watch_id = index,
                    "stop_observing called with existing subscriptions"
                );
                subscription.release();
            }
        }
        debug!("stopped native position observation");

        result
    }

    /// Returns `true` while native observation is running.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.state.borrow().updates_enabled
    }

    /// Number of watches that have not been cleared.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

impl std::fmt::Debug for WatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WatchRegistry")
            .field("slots", &state.subscriptions.len())
            .field("updates_enabled", &state.updates_enabled)
            .finish_non_exhaustive()
    }
}
