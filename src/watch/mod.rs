//! Position watches.
//!
//! A watch is a standing subscription to `positionChanged` (and optionally
//! `positionError`) events. All watches share one native observation: the
//! first watch starts it, clearing the last one stops it.
//!
//! Watch identifiers are slot indices. A cleared slot stays empty so the
//! identifiers of other watches remain valid.

mod registry;

pub use registry::{WatchErrorHandler, WatchId, WatchRegistry};
