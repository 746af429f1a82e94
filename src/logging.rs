//! Logging initialization.
//!
//! GeoWatch emits structured `tracing` events: `debug` for watch and geofence
//! lifecycle, `warn` for recovered inconsistencies (stale watches, events for
//! unknown geofences), `error` for one-shot position failures with no error
//! handler. Hosts that already install a subscriber can skip this module.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when `RUST_LOG` is unset.
pub const LOG_LEVEL_ENV: &str = "GEOWATCH_LOG_LEVEL";

/// Error type for logging setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Installs a global fmt subscriber.
///
/// The filter comes from `RUST_LOG`, else from [`LOG_LEVEL_ENV`], else from
/// `default_level` (e.g. `"info"` or `"geowatch_core=debug"`).
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a global subscriber
/// is already set.
pub fn init_logging(default_level: &str) -> Result<(), LoggingError> {
    let env_filter = build_filter(default_level)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()?;

    Ok(())
}

fn build_filter(default_level: &str) -> Result<EnvFilter, ParseError> {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_level.to_string());
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&level))
}
