//! Router assembly

use crate::backend::routes::control_routes::configure_control_routes;
use crate::backend::routes::proxy::handle_intercepted;
use crate::backend::server::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Control routes under `control_prefix`, interception for everything else
pub fn create_router(app_state: AppState, control_prefix: &str) -> Router<()> {
    Router::new()
        .nest(control_prefix, configure_control_routes())
        .fallback(handle_intercepted)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
