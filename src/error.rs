//! Core error types
//!
//! One enum per concern of the offline core:
//!
//! - [`FetchError`] - a network request was rejected or answered unusably
//! - [`StoreError`] - the durable entry store is missing or refused a write
//! - [`CacheError`] - the application shell could not be pre-cached
//! - [`SyncError`] - immediate or deferred delivery of entries failed
//! - [`WorkerError`] - an event could not be handled by the background worker
//!
//! Losing data on a schema upgrade is deliberately not an error: it is
//! logged by the store and otherwise silent.

use crate::shared::activity::ActivityId;
use crate::shared::error::SharedError;
use thiserror::Error;

/// Network failure while fetching a resource
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response
    #[error("network request to {url} failed: {message}")]
    Network {
        url: String,
        message: String,
    },

    /// A response arrived but the caller requires a success status
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: u16,
    },

    /// The request body could not be encoded
    #[error("invalid request body for {url}: {message}")]
    InvalidBody {
        url: String,
        message: String,
    },

    /// A navigation failed and the offline page is not cached
    #[error("offline page {path} is not cached")]
    OfflinePageUnavailable {
        path: String,
    },
}

impl FetchError {
    /// Create a new network error
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// Durable entry store failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// The collection does not exist (never created or dropped)
    #[error("collection '{collection}' does not exist")]
    Unavailable {
        collection: &'static str,
    },

    /// A write was attempted and refused
    #[error("could not save activity: {message}")]
    WriteFailure {
        message: String,
    },

    /// The recorded schema is newer than this build understands
    #[error("database schema version {found} is newer than supported {supported}")]
    UnsupportedSchemaVersion {
        found: i64,
        supported: i64,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] SharedError),
}

/// Failure while pre-caching the application shell
#[derive(Debug, Error)]
pub enum CacheError {
    /// One asset could not be fetched; nothing was cached
    #[error("failed to pre-cache {asset}: {source}")]
    InstallFailed {
        asset: String,
        #[source]
        source: FetchError,
    },

    /// An asset path does not resolve against the origin
    #[error("invalid asset path {asset}: {message}")]
    InvalidAsset {
        asset: String,
        message: String,
    },
}

/// Failure delivering entries to the remote endpoint
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Remote delivery of one entry failed; the batch stopped there
    #[error("failed to sync activity {id}: {source}")]
    Remote {
        id: ActivityId,
        #[source]
        source: FetchError,
    },

    /// Force-sync requested while disconnected
    #[error("a network connection is required to force synchronization")]
    Offline,

    /// The background worker is gone
    #[error("the background worker is not running")]
    WorkerUnavailable,
}

/// Failure reported by the background worker
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker's event loop has stopped
    #[error("the background worker is not running")]
    Unavailable,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}
