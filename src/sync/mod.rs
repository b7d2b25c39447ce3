//! # Sync Module
//!
//! Delivery of locally persisted activities to the remote endpoint.
//!
//! ## Key Components
//!
//! - [`coordinator::SyncCoordinator`]: save-then-send for new entries, with
//!   a deferred registration when the immediate push is impossible
//! - [`registration::SyncRegistry`]: remembers deferred sync tags and fires
//!   them at the worker once the connection is back
//! - [`executor::DeferredSyncExecutor`]: drains the entry store, one entry
//!   at a time, deleting each acknowledged entry
//! - [`remote::SyncEndpoint`]: the `POST` to the remote endpoint

pub mod coordinator;
pub mod executor;
pub mod registration;
pub mod remote;

pub use coordinator::{ForceSyncOutcome, SaveOutcome, SaveReport, SyncCoordinator};
pub use executor::{DeferredSyncExecutor, DrainReport, ExecutorState};
pub use registration::SyncRegistry;
pub use remote::SyncEndpoint;
