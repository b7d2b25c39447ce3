//! # Client Hub
//!
//! Every open UI instance subscribes to the hub and receives a copy of each
//! [`WorkerMessage`] the worker posts. The hub also records whether the
//! worker has claimed the open instances.
//!
//! Messages go through a `tokio::sync::broadcast` channel; a subscriber that
//! falls behind skips the messages it lagged on instead of blocking the
//! worker.

use crate::shared::message::WorkerMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Broadcast channel from the worker to all UI instances
#[derive(Debug, Clone)]
pub struct ClientHub {
    tx: broadcast::Sender<WorkerMessage>,
    claimed: Arc<AtomicBool>,
}

impl ClientHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connect a new UI instance
    pub fn subscribe(&self) -> Client {
        let client = Client {
            id: Uuid::new_v4(),
            rx: self.tx.subscribe(),
        };
        tracing::debug!("[Clients] client {} connected", client.id);
        client
    }

    /// Post `message` to every connected instance
    ///
    /// Returns the number of instances that received it (0 when none are
    /// connected).
    pub fn post_all(&self, message: WorkerMessage) -> usize {
        match self.tx.send(message) {
            Ok(count) => {
                tracing::debug!("[Clients] message posted to {} clients", count);
                count
            }
            Err(_) => {
                tracing::debug!("[Clients] no connected clients, message dropped");
                0
            }
        }
    }

    pub fn connected(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Take control of every open instance immediately
    pub fn claim(&self, cache_version: &str) -> usize {
        self.claimed.store(true, Ordering::SeqCst);
        tracing::info!("[Clients] claiming {} open clients", self.connected());
        self.post_all(WorkerMessage::ControllerChange {
            cache_version: cache_version.to_string(),
        })
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

impl Default for ClientHub {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One connected UI instance
#[derive(Debug)]
pub struct Client {
    pub id: Uuid,
    rx: broadcast::Receiver<WorkerMessage>,
}

impl Client {
    /// Next message; `None` once the worker is gone
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Clients] client {} lagged, skipped {} messages", self.id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered message, without waiting
    pub fn try_recv(&mut self) -> Option<WorkerMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Underlying receiver, for streaming
    pub fn into_receiver(self) -> broadcast::Receiver<WorkerMessage> {
        self.rx
    }
}
