//! Reusable test helpers for location services integration tests.
//!
//! Each `Harness` owns its own emitter, `RecordingNative` and
//! `LocationServices`, so tests never share state.

#![allow(dead_code)]

use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use geowatch_core::events::DeviceEventEmitter;
use geowatch_core::geofence::IdentifierStrategy;
use geowatch_core::location::{Coordinates, Position};
use geowatch_core::testing::RecordingNative;
use geowatch_core::{LocationServices, LocationServicesConfig};

/// A services instance wired to a recording native module.
pub struct Harness {
    pub native: Rc<RecordingNative>,
    pub services: Rc<LocationServices>,
}

/// Creates a harness with sequential geofence identifiers.
pub fn harness() -> Harness {
    harness_with(IdentifierStrategy::Sequential)
}

/// Creates a harness with the given identifier strategy.
pub fn harness_with(identifier_strategy: IdentifierStrategy) -> Harness {
    let emitter = DeviceEventEmitter::new();
    let native = Rc::new(RecordingNative::new(emitter.clone()));
    let config = LocationServicesConfig {
        identifier_strategy,
        ..Default::default()
    };
    let services = LocationServices::with_config(native.clone(), emitter, config)
        .expect("default options are valid");

    Harness {
        native,
        services: Rc::new(services),
    }
}

/// A fix at the given coordinates, stamped now.
pub fn fix(latitude: f64, longitude: f64) -> Position {
    Position::new(Coordinates::new(latitude, longitude))
}

/// Shared byte buffer used as a `tracing` writer.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber and returns its log output.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
