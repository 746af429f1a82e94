//! Test utilities: a native location module that records every call.
//!
//! Only compiled for tests or with the `test-utils` feature. DO NOT use in
//! production.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use crate::events::{DeviceEventEmitter, NativeEvent};
use crate::geofence::GeofenceRegion;
use crate::location::{Position, PositionError, PositionOptions};
use crate::native::{
    ErrorCallback, NativeError, NativeLocationModule, PositionCallback, RegionsCallback, Result,
};

/// A call received by [`RecordingNative`].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    GetCurrentPosition(PositionOptions),
    StartObserving(PositionOptions),
    StopObserving,
    SetGeofence(GeofenceRegion),
    RemoveGeofence(GeofenceRegion),
    ClearAllGeofences,
    MonitoredRegions,
}

impl NativeCall {
    /// Method name of the call, e.g. `"start_observing"`.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::GetCurrentPosition(_) => "get_current_position",
            Self::StartObserving(_) => "start_observing",
            Self::StopObserving => "stop_observing",
            Self::SetGeofence(_) => "set_geofence",
            Self::RemoveGeofence(_) => "remove_geofence",
            Self::ClearAllGeofences => "clear_all_geofences",
            Self::MonitoredRegions => "monitored_regions",
        }
    }
}

/// Fake native module.
///
/// - Records every call in order.
/// - Tracks the regions it was asked to monitor and reports them from
///   `monitored_regions` synchronously.
/// - Parks one-shot position requests until the test resolves or rejects
///   them.
/// - Fails the next call of a given operation on request.
/// - Pushes events into the emitter it was created with.
#[derive(Default)]
pub struct RecordingNative {
    emitter: DeviceEventEmitter,
    calls: RefCell<Vec<NativeCall>>,
    regions: RefCell<BTreeMap<String, GeofenceRegion>>,
    pending: RefCell<VecDeque<(PositionCallback, ErrorCallback)>>,
    failures: RefCell<Vec<(&'static str, NativeError)>>,
}

impl std::fmt::Debug for RecordingNative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingNative")
            .field("calls", &self.calls.borrow().len())
            .field("regions", &self.regions.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .finish_non_exhaustive()
    }
}

impl RecordingNative {
    /// Creates a module that emits into `emitter`.
    #[must_use]
    pub fn new(emitter: DeviceEventEmitter) -> Self {
        Self {
            emitter,
            ..Self::default()
        }
    }

    /// The emitter events are pushed into.
    #[must_use]
    pub const fn emitter(&self) -> &DeviceEventEmitter {
        &self.emitter
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.borrow().clone()
    }

    /// How many times `operation` was called.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forgets recorded calls.
    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: NativeError) {
        self.failures.borrow_mut().push((operation, error));
    }

    /// Regions currently monitored by this fake.
    #[must_use]
    pub fn native_regions(&self) -> Vec<GeofenceRegion> {
        self.regions.borrow().values().cloned().collect()
    }

    /// Number of parked one-shot requests.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolves the oldest parked one-shot request with `position`.
    ///
    /// Returns `false` if nothing was pending.
    pub fn resolve_current_position(&self, position: Position) -> bool {
        let Some((on_success, _)) = self.pending.borrow_mut().pop_front() else {
            return false;
        };
        on_success(position);
        true
    }

    /// Rejects the oldest parked one-shot request with `error`.
    ///
    /// Returns `false` if nothing was pending.
    pub fn reject_current_position(&self, error: PositionError) -> bool {
        let Some((_, on_error)) = self.pending.borrow_mut().pop_front() else {
            return false;
        };
        on_error(error);
        true
    }

    /// Emits `positionChanged`.
    pub fn emit_position(&self, position: Position) -> usize {
        self.emitter.emit(&NativeEvent::PositionChanged(position))
    }

    /// Emits `positionError`.
    pub fn emit_error(&self, error: PositionError) -> usize {
        self.emitter.emit(&NativeEvent::PositionError(error))
    }

    /// Emits `geofenceEntered` for `identifier`.
    pub fn enter(&self, identifier: &str) -> usize {
        self.emitter.emit(&NativeEvent::geofence_entered(identifier))
    }

    /// Emits `geofenceExited` for `identifier`.
    pub fn exit(&self, identifier: &str) -> usize {
        self.emitter.emit(&NativeEvent::geofence_exited(identifier))
    }

    fn record(&self, call: NativeCall) -> Result<()> {
        let operation = call.operation();
        self.calls.borrow_mut().push(call);

        let mut failures = self.failures.borrow_mut();
        match failures.iter().position(|(op, _)| *op == operation) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }
}

impl NativeLocationModule for RecordingNative {
    fn get_current_position(
        &self,
        options: &PositionOptions,
        on_success: PositionCallback,
        on_error: ErrorCallback,
    ) -> Result<()> {
        self.record(NativeCall::GetCurrentPosition(options.clone()))?;
        self.pending.borrow_mut().push_back((on_success, on_error));
        Ok(())
    }

    fn start_observing(&self, options: &PositionOptions) -> Result<()> {
        self.record(NativeCall::StartObserving(options.clone()))
    }

    fn stop_observing(&self) -> Result<()> {
        self.record(NativeCall::StopObserving)
    }

    fn set_geofence(&self, region: &GeofenceRegion) -> Result<()> {
        self.record(NativeCall::SetGeofence(region.clone()))?;
        self.regions
            .borrow_mut()
            .insert(region.identifier.clone(), region.clone());
        Ok(())
    }

    fn remove_geofence(&self, region: &GeofenceRegion) -> Result<()> {
        self.record(NativeCall::RemoveGeofence(region.clone()))?;
        self.regions.borrow_mut().remove(&region.identifier);
        Ok(())
    }

    fn clear_all_geofences(&self) -> Result<()> {
        self.record(NativeCall::ClearAllGeofences)?;
        self.regions.borrow_mut().clear();
        Ok(())
    }

    fn monitored_regions(&self, callback: RegionsCallback) -> Result<()> {
        self.record(NativeCall::MonitoredRegions)?;
        callback(self.native_regions());
        Ok(())
    }
}
