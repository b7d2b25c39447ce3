//! Cross-instance messages
//!
//! The worker posts [`WorkerMessage`]s to every connected UI instance and
//! UI instances post [`ClientMessage`]s back to the worker.
//!
//! ```json
//! {"type": "sync-success", "payload": 4}
//! {"type": "force-sync"}
//! ```

use crate::shared::activity::ActivityId;
use serde::{Deserialize, Serialize};

/// Message posted by the worker to all UI instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// One entry was acknowledged by the remote endpoint and removed locally
    SyncSuccess(ActivityId),
    /// A drain finished, completely or aborted on the first failure
    SyncCompleted {
        successful: usize,
        failed: usize,
    },
    /// The worker took control of all open instances
    ControllerChange {
        cache_version: String,
    },
}

impl WorkerMessage {
    /// Event name used when the message is streamed
    pub fn event_name(&self) -> &'static str {
        match self {
            WorkerMessage::SyncSuccess(_) => "sync-success",
            WorkerMessage::SyncCompleted { .. } => "sync-completed",
            WorkerMessage::ControllerChange { .. } => "controller-change",
        }
    }
}

/// Message posted by a UI instance to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Drain the store now instead of waiting for a connectivity change
    ForceSync,
}
