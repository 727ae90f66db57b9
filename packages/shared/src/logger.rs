//! Logging setup shared by roomcast binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, this binary's target and the server
/// library log at `default_level`, and everything else at `warn`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let default_directive = format!(
        "warn,{}={level},roomcast_server={level},tower_http={level}",
        bin_name.replace('-', "_"),
        level = default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init: tests may install a subscriber more than once
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .try_init();
}
