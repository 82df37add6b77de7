//! One-time logging bootstrap.
//!
//! The framework itself only emits `tracing` events; installing a subscriber
//! is the host application's call. This helper wires up a sensible default
//! and is safe to call more than once.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a formatted `tracing` subscriber as the global default.
///
/// The filter comes from `RUST_LOG` when set; otherwise `debug` lowers the
/// default level from `info` to `debug`. Subsequent calls are no-ops, as is
/// calling it when another subscriber is already installed.
pub fn init(debug: bool) {
    INIT.call_once(|| {
        let fallback = if debug { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        // keep whichever subscriber was installed first
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
