//! Tracing initialization for hosts and test binaries
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the host's decision.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber honoring `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
