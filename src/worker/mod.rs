//! # Background Worker
//!
//! A long-lived task that owns request interception and deferred sync. It
//! receives [`WorkerEvent`]s over an `mpsc` channel and handles them by
//! name, the same five events a browser service worker gets:
//!
//! - `install`: pre-cache the application shell (inline)
//! - `activate`: evict stale partitions and claim every client (inline)
//! - `fetch`: answer an intercepted request (own task)
//! - `sync`: run a registered background sync tag (own task)
//! - `message`: handle a [`ClientMessage`] from a UI instance (own task)
//!
//! Lifecycle events are handled inline so the state machine advances in
//! order; fetch and sync work is spawned so a slow network never stalls the
//! loop. Until the worker is activated, fetches pass straight through to
//! the network.

pub mod clients;

use crate::cache::{LifecycleState, PolicyEngine};
use crate::error::{CacheError, FetchError, SyncError, WorkerError};
use crate::network::{Request, Response};
use crate::shared::message::ClientMessage;
use crate::sync::executor::{DeferredSyncExecutor, DrainReport};
use clients::ClientHub;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// An event delivered to the worker
#[derive(Debug)]
pub enum WorkerEvent {
    Install {
        reply: oneshot::Sender<Result<usize, CacheError>>,
    },
    Activate {
        reply: oneshot::Sender<Vec<String>>,
    },
    Fetch {
        request: Request,
        reply: oneshot::Sender<Result<Response, FetchError>>,
    },
    Sync {
        tag: String,
        reply: oneshot::Sender<Result<DrainReport, SyncError>>,
    },
    Message(ClientMessage),
}

/// Sending half of the worker's event channel
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<WorkerEvent>,
}

impl WorkerHandle {
    /// Create a handle and the receiver a [`Worker`] runs on
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<WorkerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(&self, event: impl FnOnce(oneshot::Sender<T>) -> WorkerEvent) -> Result<T, WorkerError> {
        let (reply, response) = oneshot::channel();
        self.tx.send(event(reply)).await.map_err(|_| WorkerError::Unavailable)?;
        response.await.map_err(|_| WorkerError::Unavailable)
    }

    /// Run the `install` handler; returns the number of pre-cached assets
    pub async fn install(&self) -> Result<usize, WorkerError> {
        Ok(self.request(|reply| WorkerEvent::Install { reply }).await??)
    }

    /// Run the `activate` handler; returns the deleted partition names
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        self.request(|reply| WorkerEvent::Activate { reply }).await
    }

    /// Intercept `request`
    pub async fn fetch(&self, request: Request) -> Result<Response, WorkerError> {
        Ok(self.request(|reply| WorkerEvent::Fetch { request, reply }).await??)
    }

    /// Run the `sync` handler for `tag`
    pub async fn sync(&self, tag: &str) -> Result<DrainReport, WorkerError> {
        let tag = tag.to_string();
        Ok(self.request(|reply| WorkerEvent::Sync { tag, reply }).await??)
    }

    /// Deliver a client message without waiting for it to be handled
    pub async fn post_message(&self, message: ClientMessage) -> Result<(), WorkerError> {
        self.tx
            .send(WorkerEvent::Message(message))
            .await
            .map_err(|_| WorkerError::Unavailable)
    }
}

/// The worker task's state
pub struct Worker {
    engine: PolicyEngine,
    executor: Arc<DeferredSyncExecutor>,
    clients: ClientHub,
    lifecycle: watch::Sender<LifecycleState>,
    sync_tag: String,
    shell_assets: Vec<String>,
}

impl Worker {
    pub fn new(
        engine: PolicyEngine,
        executor: Arc<DeferredSyncExecutor>,
        clients: ClientHub,
        sync_tag: impl Into<String>,
        shell_assets: Vec<String>,
    ) -> Self {
        let (lifecycle, _) = watch::channel(LifecycleState::Parsed);
        Self {
            engine,
            executor,
            clients,
            lifecycle,
            sync_tag: sync_tag.into(),
            shell_assets,
        }
    }

    /// Lifecycle updates, readable after the worker was spawned
    pub fn lifecycle(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Run the event loop until every [`WorkerHandle`] is dropped
    pub fn spawn(self, events: mpsc::Receiver<WorkerEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }

    async fn run(self, mut events: mpsc::Receiver<WorkerEvent>) {
        tracing::info!("[Worker] started");
        while let Some(event) = events.recv().await {
            self.dispatch(event).await;
        }
        tracing::info!("[Worker] all handles dropped, stopping");
    }

    async fn dispatch(&self, event: WorkerEvent) {
        match event {
            WorkerEvent::Install { reply } => {
                let _ = reply.send(self.on_install().await);
            }
            WorkerEvent::Activate { reply } => {
                let _ = reply.send(self.on_activate().await);
            }
            WorkerEvent::Fetch { request, reply } => self.on_fetch(request, reply),
            WorkerEvent::Sync { tag, reply } => self.on_sync(tag, reply),
            WorkerEvent::Message(message) => self.on_message(message),
        }
    }

    fn current(&self) -> LifecycleState {
        *self.lifecycle.borrow()
    }

    async fn on_install(&self) -> Result<usize, CacheError> {
        self.lifecycle.send_replace(LifecycleState::Installing);
        tracing::info!("[Worker] installing");
        match self.engine.install(&self.shell_assets).await {
            Ok(count) => {
                // skip waiting: the next step is activation
                self.lifecycle.send_replace(LifecycleState::Installed);
                Ok(count)
            }
            Err(err) => {
                tracing::error!("[Worker] install failed: {}", err);
                self.lifecycle.send_replace(LifecycleState::Redundant);
                Err(err)
            }
        }
    }

    async fn on_activate(&self) -> Vec<String> {
        match self.current() {
            LifecycleState::Installed => {}
            LifecycleState::Activated => return Vec::new(),
            state => {
                tracing::warn!("[Worker] cannot activate from state {:?}", state);
                return Vec::new();
            }
        }

        self.lifecycle.send_replace(LifecycleState::Activating);
        let deleted = self.engine.activate().await;
        self.clients.claim(self.engine.names().version());
        self.lifecycle.send_replace(LifecycleState::Activated);
        tracing::info!("[Worker] activated, {} stale partitions removed", deleted.len());
        deleted
    }

    fn on_fetch(&self, request: Request, reply: oneshot::Sender<Result<Response, FetchError>>) {
        let engine = self.engine.clone();
        let intercept = self.current() == LifecycleState::Activated;
        tokio::spawn(async move {
            let result = if intercept {
                engine.handle(request).await
            } else {
                engine.network.fetch(request).await
            };
            let _ = reply.send(result);
        });
    }

    fn on_sync(&self, tag: String, reply: oneshot::Sender<Result<DrainReport, SyncError>>) {
        if tag != self.sync_tag {
            tracing::debug!("[Worker] ignoring unknown sync tag '{}'", tag);
            let _ = reply.send(Ok(DrainReport::default()));
            return;
        }
        tracing::info!("[Worker] background sync '{}' triggered", tag);
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let _ = reply.send(executor.drain().await);
        });
    }

    fn on_message(&self, message: ClientMessage) {
        match message {
            ClientMessage::ForceSync => {
                tracing::info!("[Worker] force sync requested");
                let executor = Arc::clone(&self.executor);
                tokio::spawn(async move {
                    if let Err(err) = executor.drain().await {
                        tracing::warn!("[Worker] forced sync stopped: {}", err);
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_reports_stopped_worker() {
        let (handle, events) = WorkerHandle::channel(4);
        drop(events);
        assert!(handle.is_closed());
        assert!(matches!(handle.activate().await, Err(WorkerError::Unavailable)));
        assert!(matches!(
            handle.post_message(ClientMessage::ForceSync).await,
            Err(WorkerError::Unavailable)
        ));
    }
}
