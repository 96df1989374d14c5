//! Logging setup for binaries and examples
//!
//! The library itself only emits `tracing` events; hosts that already have a
//! subscriber need nothing from here.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Initialize a stdout subscriber filtered by RUST_LOG (default "info")
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(env_filter),
        )
        .try_init();
}
