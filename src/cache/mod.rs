//! # Request Classifier & Cache Policy Engine
//!
//! Intercepted requests are classified into one of three caching strategies
//! and answered from named, versioned cache partitions and the network.
//!
//! ## Key Components
//!
//! - `names.rs`: versioned partition names (`static-v1`, `images-v1`, ...)
//! - `classifier.rs`: request → strategy
//! - `strategies.rs`: cache-first, stale-while-revalidate, network-first
//! - `lifecycle.rs`: install (shell pre-cache) and activate (eviction)
//!
//! ## Storage
//!
//! [`CacheStorage`] is the process-wide namespace of partitions. Partitions
//! are created on first open and kept in creation order, which is also the
//! order [`CacheStorage::match_any`] searches them in. Only `GET` requests
//! are ever stored.

pub mod classifier;
pub mod lifecycle;
pub mod names;
pub mod strategies;

pub use classifier::{RequestClassifier, Strategy};
pub use lifecycle::LifecycleState;
pub use names::{CacheNames, PartitionKind};
pub use strategies::PolicyEngine;

use crate::network::{Method, Request, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A named bucket of request → response pairs
#[derive(Debug)]
pub struct Partition {
    name: String,
    entries: RwLock<HashMap<String, Response>>,
}

impl Partition {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cached response for `request`, if any
    pub async fn match_request(&self, request: &Request) -> Option<Response> {
        if request.method != Method::GET {
            return None;
        }
        self.entries.read().await.get(&request.cache_key()).cloned()
    }

    /// Store `response` under `request`
    ///
    /// Returns `false` without storing anything for non-`GET` requests.
    pub async fn put(&self, request: &Request, response: Response) -> bool {
        if request.method != Method::GET {
            tracing::debug!("[Cache] not caching {} {}", request.method, request.url);
            return false;
        }
        self.entries.write().await.insert(request.cache_key(), response);
        true
    }

    pub async fn delete(&self, request: &Request) -> bool {
        self.entries.write().await.remove(&request.cache_key()).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Cached URLs, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Name and size of one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    pub name: String,
    pub entries: usize,
}

/// Process-wide namespace of cache partitions
#[derive(Debug, Default)]
pub struct CacheStorage {
    partitions: RwLock<Vec<Arc<Partition>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name`, creating it when missing
    pub async fn open(&self, name: &str) -> Arc<Partition> {
        if let Some(partition) = self.find(name).await {
            return partition;
        }
        let mut partitions = self.partitions.write().await;
        // another opener may have won the race for the write lock
        if let Some(partition) = partitions.iter().find(|p| p.name == name) {
            return Arc::clone(partition);
        }
        tracing::debug!("[Cache] creating partition {}", name);
        let partition = Arc::new(Partition::new(name));
        partitions.push(Arc::clone(&partition));
        partition
    }

    async fn find(&self, name: &str) -> Option<Arc<Partition>> {
        self.partitions
            .read()
            .await
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.find(name).await.is_some()
    }

    /// Partition names in creation order
    pub async fn keys(&self) -> Vec<String> {
        self.partitions
            .read()
            .await
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Delete a whole partition; returns whether it existed
    pub async fn delete(&self, name: &str) -> bool {
        let mut partitions = self.partitions.write().await;
        let before = partitions.len();
        partitions.retain(|p| p.name != name);
        partitions.len() != before
    }

    /// First cached response for `request` across all partitions
    pub async fn match_any(&self, request: &Request) -> Option<Response> {
        let partitions: Vec<Arc<Partition>> = self.partitions.read().await.clone();
        for partition in partitions {
            if let Some(response) = partition.match_request(request).await {
                return Some(response);
            }
        }
        None
    }

    pub async fn summary(&self) -> Vec<PartitionSummary> {
        let partitions: Vec<Arc<Partition>> = self.partitions.read().await.clone();
        let mut summary = Vec::with_capacity(partitions.len());
        for partition in partitions {
            summary.push(PartitionSummary {
                name: partition.name.clone(),
                entries: partition.len().await,
            });
        }
        summary
    }
}
