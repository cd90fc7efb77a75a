//! Opt-in tracing bootstrap.
//!
//! Library modules only emit `tracing` events; installing a subscriber is
//! left to the embedding binary. This helper sets up a stderr subscriber
//! honoring `RUST_LOG` for binaries and examples that want output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
