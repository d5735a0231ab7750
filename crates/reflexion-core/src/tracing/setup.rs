//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "REFLEXION_LOG";

/// Filter used when `REFLEXION_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "reflexion=info";

/// Initialize logging for the host process.
///
/// Reads `REFLEXION_LOG` for per-module log levels, e.g.
/// `REFLEXION_LOG=reflexion_recommend::engine=debug,reflexion_core=warn`.
///
/// Calling this more than once is harmless.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
