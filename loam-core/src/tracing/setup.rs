//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Loam tracing/logging system.
///
/// Reads the `LOAM_LOG` environment variable for per-subsystem log levels.
/// Format: `LOAM_LOG=loam_storage=debug,loam_core=info`
///
/// Falls back to `loam=info` if `LOAM_LOG` is not set or is invalid.
///
/// This function is idempotent; calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("LOAM_LOG").unwrap_or_else(|_| EnvFilter::new("loam=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
