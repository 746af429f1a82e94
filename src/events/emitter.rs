//! In-process event transport between the native layer and listeners.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use super::types::{EventKind, NativeEvent};

type Listener = Rc<dyn Fn(&NativeEvent)>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    /// Keyed by registration order.
    listeners: BTreeMap<u64, (EventKind, Listener)>,
}

/// Delivers [`NativeEvent`]s to registered listeners.
///
/// The emitter is a cheap handle: clones share the same listener table, so
/// the native module and the registries can each hold one. Delivery is
/// synchronous and happens on the caller's thread.
///
/// Listeners may add or release subscriptions while an event is being
/// delivered. A listener released by an earlier listener of the same
/// delivery is skipped.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use geowatch_core::events::{DeviceEventEmitter, EventKind, NativeEvent};
///
/// let emitter = DeviceEventEmitter::new();
/// let hits = Rc::new(Cell::new(0));
///
/// let counter = Rc::clone(&hits);
/// let subscription = emitter.add_listener(EventKind::GeofenceEntered, move |_| {
///     counter.set(counter.get() + 1);
/// });
///
/// emitter.emit(&NativeEvent::geofence_entered("home"));
/// subscription.release();
/// emitter.emit(&NativeEvent::geofence_entered("home"));
///
/// assert_eq!(hits.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct DeviceEventEmitter {
    table: Rc<RefCell<ListenerTable>>,
}

impl DeviceEventEmitter {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// released or dropped.
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&NativeEvent) + 'static,
    {
        let listener: Listener = Rc::new(listener);
        let mut table = self.table.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        table.listeners.insert(id, (kind, listener));

        Subscription {
            id,
            kind,
            table: Rc::downgrade(&self.table),
        }
    }

    /// Delivers `event` to every listener registered for its kind.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &NativeEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(u64, Listener)> = self
            .table
            .borrow()
            .listeners
            .iter()
            .filter(|(_, (listener_kind, _))| *listener_kind == kind)
            .map(|(id, (_, listener))| (*id, Rc::clone(listener)))
            .collect();

        let mut delivered = 0;
        for (id, listener) in snapshot {
            if !self.table.borrow().listeners.contains_key(&id) {
                continue;
            }
            listener(event);
            delivered += 1;
        }

        trace!(event = %kind, delivered, "emitted native event");
        delivered
    }

    /// Parses a JSON event pushed by a host bridge and delivers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid [`NativeEvent`]; no
    /// listener is invoked in that case.
    pub fn emit_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let event = NativeEvent::from_json(json)?;
        Ok(self.emit(&event))
    }

    /// Returns how many listeners are registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.table
            .borrow()
            .listeners
            .values()
            .filter(|(listener_kind, _)| *listener_kind == kind)
            .count()
    }
}

impl std::fmt::Debug for DeviceEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceEventEmitter")
            .field("listeners", &self.table.borrow().listeners.len())
            .finish()
    }
}

/// Handle to a registered listener.
///
/// Releasing the handle, explicitly or by dropping it, unregisters the
/// listener. Releasing after the emitter itself is gone is a no-op.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    table: Weak<RefCell<ListenerTable>>,
}

impl Subscription {
    /// The event stream this subscription listens to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns `true` while the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.borrow().listeners.contains_key(&self.id))
    }

    /// Unregisters the listener.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().listeners.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}
