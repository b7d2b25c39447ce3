//! # Sync Coordinator
//!
//! Entry point for new activities. An activity is always persisted first;
//! only then is delivery attempted:
//!
//! - online: push it right away; if that fails, register a deferred sync
//! - offline: register a deferred sync
//!
//! The coordinator never waits for a deferred sync to run. Its report tells
//! the UI which of the three outcomes happened.

use crate::error::SyncError;
use crate::local_db::EntryStore;
use crate::network::connectivity::ConnectivityMonitor;
use crate::shared::activity::{Activity, ActivityId, NewActivity};
use crate::shared::message::ClientMessage;
use crate::sync::registration::SyncRegistry;
use crate::sync::remote::SyncEndpoint;
use crate::worker::WorkerHandle;
use serde::Serialize;
use std::sync::Arc;

/// How a submitted activity was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SaveOutcome {
    /// Persisted and accepted by the remote endpoint
    SavedAndSent,
    /// Persisted; the immediate push failed
    SavedLocallyWillRetry { sync_registered: bool },
    /// Persisted while offline
    SavedLocally { sync_registered: bool },
}

impl SaveOutcome {
    /// User-facing status line
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::SavedAndSent => "Activity saved and sent to server!",
            SaveOutcome::SavedLocallyWillRetry { .. } => "Saved locally. Will sync when the server is reachable.",
            SaveOutcome::SavedLocally { sync_registered: true } => {
                "Saved offline. Will sync automatically when back online."
            }
            SaveOutcome::SavedLocally { sync_registered: false } => "Saved offline.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub id: ActivityId,
    #[serde(flatten)]
    pub outcome: SaveOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceSyncOutcome {
    /// The worker was asked to drain; completion arrives as worker messages
    Initiated,
}

#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    store: Arc<EntryStore>,
    endpoint: SyncEndpoint,
    monitor: ConnectivityMonitor,
    registry: SyncRegistry,
    worker: WorkerHandle,
    sync_tag: String,
    delete_after_push: bool,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<EntryStore>,
        endpoint: SyncEndpoint,
        monitor: ConnectivityMonitor,
        registry: SyncRegistry,
        worker: WorkerHandle,
        sync_tag: impl Into<String>,
    ) -> Self {
        Self {
            store,
            endpoint,
            monitor,
            registry,
            worker,
            sync_tag: sync_tag.into(),
            delete_after_push: false,
        }
    }

    /// Remove an entry from the store once the immediate push succeeded
    pub fn delete_after_push(mut self, enabled: bool) -> Self {
        self.delete_after_push = enabled;
        self
    }

    /// Persist `activity`, then send it or defer it
    pub async fn submit(&self, activity: NewActivity) -> Result<SaveReport, SyncError> {
        let id = self.store.create(&activity).await?;
        let persisted = Activity::from_new(id, activity);

        if !self.monitor.is_online() {
            tracing::info!("[Sync] offline, activity {} queued for background sync", id);
            let sync_registered = self.register().await;
            return Ok(SaveReport {
                id,
                outcome: SaveOutcome::SavedLocally { sync_registered },
            });
        }

        let outcome = match self.endpoint.push(&persisted).await {
            Ok(()) => {
                if self.delete_after_push {
                    if let Err(err) = self.store.delete_by_id(id).await {
                        tracing::warn!("[Sync] activity {} sent but not removed locally: {}", id, err);
                    }
                }
                SaveOutcome::SavedAndSent
            }
            Err(err) => {
                tracing::warn!("[Sync] immediate push of activity {} failed: {}", id, err);
                let sync_registered = self.register().await;
                SaveOutcome::SavedLocallyWillRetry { sync_registered }
            }
        };
        Ok(SaveReport { id, outcome })
    }

    /// Ask the worker to drain now; rejected while offline
    pub async fn force_sync(&self) -> Result<ForceSyncOutcome, SyncError> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }
        self.worker
            .post_message(ClientMessage::ForceSync)
            .await
            .map_err(|_| SyncError::WorkerUnavailable)?;
        tracing::info!("[Sync] force sync initiated");
        Ok(ForceSyncOutcome::Initiated)
    }

    async fn register(&self) -> bool {
        match self.registry.register(&self.sync_tag).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("[Sync] background sync registration failed: {}", err);
                false
            }
        }
    }
}
