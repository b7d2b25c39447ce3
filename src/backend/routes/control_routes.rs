//! Control routes
//!
//! The UI collaborator's interface to the offline core. Request and
//! response bodies are JSON.

use crate::backend::error::GatewayError;
use crate::backend::routes::events::handle_event_subscription;
use crate::backend::server::state::AppState;
use crate::runtime::RuntimeStatus;
use crate::shared::activity::{Activity, NewActivity};
use crate::shared::message::ClientMessage;
use crate::sync::{ForceSyncOutcome, SaveReport};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn configure_control_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/activities",
            get(list_activities).post(submit_activity).delete(clear_activities),
        )
        .route("/reset", post(reset_store))
        .route("/messages", post(post_message))
        .route("/events", get(handle_event_subscription))
        .route("/connectivity", put(set_connectivity))
        .route("/status", get(status))
}

/// GET /activities
async fn list_activities(State(state): State<AppState>) -> Json<Vec<Activity>> {
    Json(state.runtime.store.list_all().await)
}

/// POST /activities
async fn submit_activity(
    State(state): State<AppState>,
    Json(activity): Json<NewActivity>,
) -> Result<(StatusCode, Json<SaveReport>), GatewayError> {
    let report = state.runtime.coordinator.submit(activity).await?;
    tracing::info!("[Gateway] activity {}: {}", report.id, report.outcome.message());
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Debug, Serialize)]
struct Cleared {
    cleared: u64,
}

/// DELETE /activities
async fn clear_activities(State(state): State<AppState>) -> Result<Json<Cleared>, GatewayError> {
    let cleared = state.runtime.store.clear_all().await?;
    Ok(Json(Cleared { cleared }))
}

/// POST /reset
async fn reset_store(State(state): State<AppState>) -> Result<StatusCode, GatewayError> {
    state.runtime.store.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /messages
async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<ClientMessage>,
) -> Result<(StatusCode, Json<ForceSyncOutcome>), GatewayError> {
    match message {
        ClientMessage::ForceSync => {
            let outcome = state.runtime.coordinator.force_sync().await?;
            Ok((StatusCode::ACCEPTED, Json(outcome)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityUpdate {
    pub online: bool,
}

#[derive(Debug, Serialize)]
struct ConnectivityChanged {
    online: bool,
    changed: bool,
}

/// PUT /connectivity
async fn set_connectivity(
    State(state): State<AppState>,
    Json(update): Json<ConnectivityUpdate>,
) -> Json<ConnectivityChanged> {
    let changed = state.runtime.monitor.set_online(update.online);
    if changed {
        tracing::info!("[Gateway] connectivity reported {}", if update.online { "online" } else { "offline" });
    }
    Json(ConnectivityChanged {
        online: update.online,
        changed,
    })
}

/// GET /status
async fn status(State(state): State<AppState>) -> Json<RuntimeStatus> {
    Json(state.runtime.status().await)
}
