//! Worker message stream
//!
//! Each subscriber is a connected client of the worker's client hub and
//! receives every [`WorkerMessage`] as one SSE event, named after the
//! message type:
//!
//! ```text
//! event: sync-success
//! data: {"type":"sync-success","payload":3}
//! ```
//!
//! Lagging subscribers skip what they missed instead of being dropped.
//!
//! [`WorkerMessage`]: crate::shared::message::WorkerMessage

use crate::backend::server::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use std::convert::Infallible;

/// GET /events
pub async fn handle_event_subscription(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let client = state.runtime.clients.subscribe();
    tracing::info!("[Gateway] client {} subscribed to worker messages", client.id);

    let stream = stream::unfold(client, |mut client| async move {
        loop {
            let message = client.recv().await?;
            match serde_json::to_string(&message) {
                Ok(data) => {
                    let event = Event::default().event(message.event_name()).data(data);
                    return Some((Ok(event), client));
                }
                Err(err) => {
                    tracing::error!("[Gateway] failed to serialize worker message: {}", err);
                    continue;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
