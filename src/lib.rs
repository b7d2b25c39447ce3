//! EcoTravel - Offline Core
//!
//! Offline caching and deferred sync for the EcoTravel activity log. UI
//! instances route their resource requests through a background worker that
//! answers them from versioned cache partitions or the network, and new
//! activities are persisted locally before any attempt to deliver them.
//!
//! # Overview
//!
//! - Request interception with three caching strategies (cache-first,
//!   stale-while-revalidate, network-first) plus an offline page
//! - Durable SQLite entry store for activities not yet delivered
//! - Background sync that drains the store when the connection returns
//! - Worker-to-client messaging (`sync-success`, `sync-completed`, ...)
//!
//! # Module Structure
//!
//! - **`shared`** - Activity model, worker/client messages, configuration
//! - **`network`** - Request/response values, the `Network` seam, connectivity
//! - **`cache`** - Classifier, strategies, partition lifecycle
//! - **`local_db`** - Durable entry store
//! - **`sync`** - Coordinator, background-sync registry, drain executor
//! - **`worker`** - Event loop and client hub
//! - **`runtime`** - Wires everything together
//! - **`backend`** - Axum gateway (only compiled with the `server` feature)
//!
//! # Feature Flags
//!
//! - **`server`** (default) - the HTTP gateway in [`backend`] and the
//!   `ecotravel-gateway` binary
//!
//! # Thread Safety
//!
//! Shared services are `Arc`-wrapped and use `tokio::sync` primitives: a
//! `watch` channel for connectivity and lifecycle, `broadcast` for client
//! messages, `mpsc` for worker events and a `Mutex` serializing drains.

/// Types shared between the core and its clients
pub mod shared;

/// Core error types
pub mod error;

/// Requests, responses and connectivity
pub mod network;

/// Cache policy engine
pub mod cache;

/// Durable entry store
pub mod local_db;

/// Immediate and deferred delivery
pub mod sync;

/// Background worker
pub mod worker;

pub mod runtime;

pub mod logging;

/// HTTP gateway
#[cfg(feature = "server")]
pub mod backend;

pub use error::{CacheError, FetchError, StoreError, SyncError, WorkerError};
pub use runtime::{OfflineRuntime, RuntimeStatus};
