//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events and spans (`pipeline.run`,
//! `pipeline.batch`, `job`); binaries call [`init_tracing`] once at startup.

use crate::config::LogFormat;
use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Builds the event filter from `RUST_LOG`, falling back to `default`.
#[must_use]
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Builds the subscriber for a log format without installing it.
#[must_use]
pub fn subscriber(format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let filter = env_filter(DEFAULT_FILTER);
    let registry = tracing_subscriber::registry();

    match format {
        LogFormat::Pretty => Box::new(registry.with(fmt::layer().with_target(true).with_filter(filter))),
        LogFormat::Json => Box::new(registry.with(fmt::layer().json().with_current_span(true).with_filter(filter))),
    }
}

/// Installs the global subscriber.
///
/// Returns false if a subscriber was already installed (e.g. by a test
/// harness); the existing one is kept.
pub fn init_tracing(format: LogFormat) -> bool {
    subscriber(format).try_init().is_ok()
}
