//! # Background Sync Registration
//!
//! A registered tag is a promise to run the matching `sync` handler once the
//! connection allows it. Registering while online fires the tag right away;
//! registering while offline keeps it until the connectivity watcher sees
//! the next transition to online.
//!
//! A tag stays registered until a `sync` run for it succeeds, so a failed
//! drain is retried on the next reconnection. Firing a tag that is already
//! in flight schedules one more run after the current one, whatever the
//! current run's outcome.

use crate::error::SyncError;
use crate::network::connectivity::{Connectivity, ConnectivityMonitor};
use crate::worker::WorkerHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct TagState {
    in_flight: bool,
    rerun: bool,
}

/// Registered deferred sync tags
#[derive(Debug, Clone)]
pub struct SyncRegistry {
    tags: Arc<Mutex<HashMap<String, TagState>>>,
    monitor: ConnectivityMonitor,
    worker: WorkerHandle,
}

impl SyncRegistry {
    pub fn new(monitor: ConnectivityMonitor, worker: WorkerHandle) -> Self {
        Self {
            tags: Arc::new(Mutex::new(HashMap::new())),
            monitor,
            worker,
        }
    }

    /// Register `tag`; fires immediately when online
    pub async fn register(&self, tag: &str) -> Result<(), SyncError> {
        if self.worker.is_closed() {
            tracing::warn!("[Sync] cannot register '{}', worker is not running", tag);
            return Err(SyncError::WorkerUnavailable);
        }

        self.tags.lock().await.entry(tag.to_string()).or_default();
        tracing::info!("[Sync] registered background sync '{}'", tag);

        if self.monitor.is_online() {
            self.fire(tag).await;
        }
        Ok(())
    }

    pub async fn is_registered(&self, tag: &str) -> bool {
        self.tags.lock().await.contains_key(tag)
    }

    /// Registered tags, sorted
    pub async fn pending(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tags.lock().await.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Fire every registered tag on each transition to online
    pub fn spawn_watcher(&self) -> JoinHandle<()> {
        let registry = self.clone();
        let mut changes = self.monitor.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let state = *changes.borrow_and_update();
                if state != Connectivity::Online {
                    continue;
                }
                let tags = registry.pending().await;
                if !tags.is_empty() {
                    tracing::info!("[Sync] connection restored, firing {} sync registrations", tags.len());
                }
                for tag in tags {
                    registry.fire(&tag).await;
                }
            }
            tracing::debug!("[Sync] connectivity watcher stopped");
        })
    }

    async fn fire(&self, tag: &str) {
        {
            let mut tags = self.tags.lock().await;
            let Some(state) = tags.get_mut(tag) else {
                return;
            };
            if state.in_flight {
                state.rerun = true;
                return;
            }
            state.in_flight = true;
        }

        let registry = self.clone();
        let tag = tag.to_string();
        tokio::spawn(async move { registry.run(tag).await });
    }

    async fn run(self, tag: String) {
        loop {
            let result = self.worker.sync(&tag).await;

            let mut tags = self.tags.lock().await;
            let Some(state) = tags.get_mut(&tag) else {
                return;
            };
            match result {
                Ok(report) if state.rerun => {
                    tracing::debug!("[Sync] '{}' synced {} entries, running again", tag, report.synced.len());
                    state.rerun = false;
                }
                Ok(report) => {
                    tracing::info!("[Sync] '{}' completed, {} entries synced", tag, report.synced.len());
                    tags.remove(&tag);
                    return;
                }
                Err(err) if state.rerun => {
                    tracing::warn!("[Sync] '{}' failed, retrying for a newer trigger: {}", tag, err);
                    state.rerun = false;
                }
                Err(err) => {
                    tracing::warn!("[Sync] '{}' failed, will retry on reconnection: {}", tag, err);
                    state.in_flight = false;
                    state.rerun = false;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerEvent;

    #[tokio::test]
    async fn test_offline_registration_waits() {
        let (handle, mut events) = WorkerHandle::channel(8);
        let monitor = ConnectivityMonitor::new(Connectivity::Offline);
        let registry = SyncRegistry::new(monitor, handle);

        registry.register("sync-entries").await.unwrap();

        assert!(registry.is_registered("sync-entries").await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_registration_requires_worker() {
        let (handle, events) = WorkerHandle::channel(8);
        drop(events);
        let registry = SyncRegistry::new(ConnectivityMonitor::new(Connectivity::Online), handle);

        assert!(matches!(registry.register("sync-entries").await, Err(SyncError::WorkerUnavailable)));
        assert!(registry.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_online_registration_fires_sync_event() {
        let (handle, mut events) = WorkerHandle::channel(8);
        let registry = SyncRegistry::new(ConnectivityMonitor::new(Connectivity::Online), handle);

        registry.register("sync-entries").await.unwrap();

        match events.recv().await {
            Some(WorkerEvent::Sync { tag, reply }) => {
                assert_eq!(tag, "sync-entries");
                reply.send(Ok(Default::default())).unwrap();
            }
            other => panic!("expected a sync event, got {:?}", other),
        }
    }
}
