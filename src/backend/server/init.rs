//! Server initialization

use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::runtime::OfflineRuntime;
use crate::shared::config::ConfigError;
use axum::Router;
use std::sync::Arc;

/// Create the gateway application for a running runtime
///
/// The runtime should already be installed and activated; until it is,
/// intercepted requests pass straight through to the origin.
pub fn create_app(runtime: Arc<OfflineRuntime>) -> Result<Router<()>, ConfigError> {
    let origin = runtime.config.origin()?;
    let control_prefix = runtime.config.control_prefix.clone();
    tracing::info!("[Gateway] proxying {} with control routes under {}", origin, control_prefix);

    let state = AppState::new(runtime, origin);
    Ok(create_router(state, &control_prefix))
}
