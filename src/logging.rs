//! Subscriber setup for binaries and tests that want to see queue activity.
//!
//! The library itself only emits `tracing` events; queues log appends,
//! starts and completions at `trace`/`debug`, batches log their start and
//! finish at `debug`. Installing a subscriber is left to the application.
//! These helpers install an `EnvFilter` + fmt layer honoring `RUST_LOG`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber, ignoring the error if one is already set.
pub fn init() {
    let _ = try_init();
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn try_init() -> Result<(), TryInitError> {
    try_init_with(DEFAULT_FILTER)
}

/// Installs the global subscriber with `fallback` as the filter used when
/// `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn try_init_with(fallback: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
