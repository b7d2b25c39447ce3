//! # Offline Runtime
//!
//! Wires the offline core together: one entry store, one cache namespace,
//! one connectivity monitor, the worker task and the sync services around
//! it. Everything is `Arc`-shared and lives as long as the runtime.
//!
//! ```rust,no_run
//! use ecotravel::network::{Connectivity, HttpNetwork};
//! use ecotravel::local_db::EntryStore;
//! use ecotravel::runtime::OfflineRuntime;
//! use ecotravel::shared::AppConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let network = Arc::new(HttpNetwork::new(Duration::from_secs(10))?);
//! let store = Arc::new(EntryStore::from_config(&config));
//! let runtime = OfflineRuntime::start(config, store, network, Connectivity::Online)?;
//! runtime.install_and_activate().await?;
//! # Ok(())
//! # }
//! ```

use crate::cache::{CacheStorage, LifecycleState, PartitionSummary, PolicyEngine};
use crate::error::WorkerError;
use crate::local_db::EntryStore;
use crate::network::connectivity::{Connectivity, ConnectivityMonitor};
use crate::network::Network;
use crate::shared::config::{AppConfig, ConfigError};
use crate::sync::{DeferredSyncExecutor, ExecutorState, SyncCoordinator, SyncEndpoint, SyncRegistry};
use crate::worker::clients::ClientHub;
use crate::worker::{Worker, WorkerHandle};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const WORKER_QUEUE: usize = 256;

/// Snapshot of the offline core, for status displays
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub online: bool,
    pub lifecycle: LifecycleState,
    pub executor: ExecutorState,
    pub cache_version: String,
    pub partitions: Vec<PartitionSummary>,
    pub pending_entries: usize,
    pub registered_syncs: Vec<String>,
    pub clients: usize,
}

pub struct OfflineRuntime {
    pub config: AppConfig,
    pub store: Arc<EntryStore>,
    pub storage: Arc<CacheStorage>,
    pub monitor: ConnectivityMonitor,
    pub clients: ClientHub,
    pub worker: WorkerHandle,
    pub registry: SyncRegistry,
    pub executor: Arc<DeferredSyncExecutor>,
    pub coordinator: SyncCoordinator,
    lifecycle: watch::Receiver<LifecycleState>,
    tasks: Vec<JoinHandle<()>>,
}

impl OfflineRuntime {
    /// Build every service and spawn the worker and the connectivity watcher
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: AppConfig,
        store: Arc<EntryStore>,
        network: Arc<dyn Network>,
        initial: Connectivity,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let storage = Arc::new(CacheStorage::new());
        let monitor = ConnectivityMonitor::new(initial);
        let clients = ClientHub::default();
        let engine = PolicyEngine::new(&config, Arc::clone(&storage), Arc::clone(&network))?;
        let endpoint = SyncEndpoint::new(network, config.sync_url()?);

        let executor = Arc::new(DeferredSyncExecutor::new(
            Arc::clone(&store),
            endpoint.clone(),
            clients.clone(),
        ));

        let (worker, events) = WorkerHandle::channel(WORKER_QUEUE);
        let task = Worker::new(
            engine,
            Arc::clone(&executor),
            clients.clone(),
            config.sync_tag.clone(),
            config.static_assets.clone(),
        );
        let lifecycle = task.lifecycle();
        let worker_task = task.spawn(events);

        let registry = SyncRegistry::new(monitor.clone(), worker.clone());
        let watcher_task = registry.spawn_watcher();

        let coordinator = SyncCoordinator::new(
            Arc::clone(&store),
            endpoint,
            monitor.clone(),
            registry.clone(),
            worker.clone(),
            config.sync_tag.clone(),
        )
        .delete_after_push(config.delete_after_immediate_push);

        tracing::info!(
            "[Runtime] started, cache version {}, {}",
            config.cache_version,
            if monitor.is_online() { "online" } else { "offline" }
        );

        Ok(Self {
            config,
            store,
            storage,
            monitor,
            clients,
            worker,
            registry,
            executor,
            coordinator,
            lifecycle,
            tasks: vec![worker_task, watcher_task],
        })
    }

    /// Install the worker, then activate it; returns the evicted partitions
    pub async fn install_and_activate(&self) -> Result<Vec<String>, WorkerError> {
        let cached = self.worker.install().await?;
        tracing::info!("[Runtime] {} shell assets cached", cached);
        self.worker.activate().await
    }

    pub fn lifecycle(&self) -> LifecycleState {
        *self.lifecycle.borrow()
    }

    pub async fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            online: self.monitor.is_online(),
            lifecycle: self.lifecycle(),
            executor: self.executor.state(),
            cache_version: self.config.cache_version.clone(),
            partitions: self.storage.summary().await,
            pending_entries: self.store.count().await,
            registered_syncs: self.registry.pending().await,
            clients: self.clients.connected(),
        }
    }

    /// Stop the worker and the connectivity watcher
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            let _ = task.await;
        }
        tracing::info!("[Runtime] stopped");
    }
}
