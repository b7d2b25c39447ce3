//! Tracing setup shared by the gateway binary and tests

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (or `default_filter`)
///
/// Calling this more than once is harmless; only the first call installs a
/// subscriber.
pub fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("[Startup] tracing initialized");
    }
}
