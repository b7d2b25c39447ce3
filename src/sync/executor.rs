//! # Deferred Sync Executor
//!
//! Drains the entry store once connectivity is back (or on a manual
//! force-sync). Entries are pushed one after another in id order; an entry
//! is deleted only after the endpoint acknowledged it, and the first failure
//! stops the batch. Whatever was not delivered stays in the store for the
//! next drain.
//!
//! At most one drain runs at a time. A second trigger waits for the running
//! drain and then starts over with what is left, which is usually nothing.

use crate::error::SyncError;
use crate::local_db::EntryStore;
use crate::shared::activity::ActivityId;
use crate::shared::message::WorkerMessage;
use crate::sync::remote::SyncEndpoint;
use crate::worker::clients::ClientHub;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Executor state, `Idle -> Draining -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorState {
    Idle,
    Draining,
}

/// Outcome of a completed drain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Delivered and deleted, in delivery order
    pub synced: Vec<ActivityId>,
    /// Entries still pending after the drain
    pub remaining: usize,
}

#[derive(Debug)]
pub struct DeferredSyncExecutor {
    store: Arc<EntryStore>,
    endpoint: SyncEndpoint,
    clients: ClientHub,
    drain_lock: Mutex<()>,
    state: watch::Sender<ExecutorState>,
}

impl DeferredSyncExecutor {
    pub fn new(store: Arc<EntryStore>, endpoint: SyncEndpoint, clients: ClientHub) -> Self {
        let (state, _) = watch::channel(ExecutorState::Idle);
        Self {
            store,
            endpoint,
            clients,
            drain_lock: Mutex::new(()),
            state,
        }
    }

    pub fn state(&self) -> ExecutorState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecutorState> {
        self.state.subscribe()
    }

    /// Push every pending entry, deleting each one the endpoint accepts
    pub async fn drain(&self) -> Result<DrainReport, SyncError> {
        let _guard = self.drain_lock.lock().await;

        let pending = self.store.list_all().await;
        if pending.is_empty() {
            tracing::debug!("[Sync] nothing to sync");
            return Ok(DrainReport::default());
        }

        self.state.send_replace(ExecutorState::Draining);
        tracing::info!("[Sync] syncing {} pending activities", pending.len());

        let mut synced = Vec::with_capacity(pending.len());
        let mut failure = None;
        for activity in &pending {
            if let Err(source) = self.endpoint.push(activity).await {
                tracing::error!("[Sync] failed to sync activity {}: {}", activity.id, source);
                failure = Some(SyncError::Remote { id: activity.id, source });
                break;
            }
            if let Err(err) = self.store.delete_by_id(activity.id).await {
                tracing::error!("[Sync] activity {} delivered but not removed: {}", activity.id, err);
                failure = Some(SyncError::Store(err));
                break;
            }
            synced.push(activity.id);
            self.clients.post_all(WorkerMessage::SyncSuccess(activity.id));
        }

        let remaining = pending.len() - synced.len();
        self.clients.post_all(WorkerMessage::SyncCompleted {
            successful: synced.len(),
            failed: remaining,
        });
        self.state.send_replace(ExecutorState::Idle);

        match failure {
            Some(err) => Err(err),
            None => {
                tracing::info!("[Sync] synced {} activities", synced.len());
                Ok(DrainReport { synced, remaining })
            }
        }
    }
}
