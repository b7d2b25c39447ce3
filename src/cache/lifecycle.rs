//! # Partition Lifecycle
//!
//! - **install**: pre-cache the application shell into the static
//!   partition. All assets are fetched first; if any one fails or answers
//!   with a non-2xx status the install fails and nothing is stored.
//! - **activate**: delete every partition whose name is not part of the
//!   current version set.

use crate::cache::names::PartitionKind;
use crate::cache::strategies::PolicyEngine;
use crate::error::{CacheError, FetchError};
use crate::network::Request;
use futures_util::future::try_join_all;
use serde::Serialize;

/// Worker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Started, not installed yet
    Parsed,
    Installing,
    Installed,
    Activating,
    /// Controlling every instance; requests go through the policy engine
    Activated,
    /// Install failed; requests bypass the caches
    Redundant,
}

impl PolicyEngine {
    /// Pre-cache `assets`, all or nothing; returns the number stored
    pub async fn install(&self, assets: &[String]) -> Result<usize, CacheError> {
        let requests = assets
            .iter()
            .map(|asset| {
                self.origin
                    .join(asset)
                    .map(Request::get)
                    .map_err(|err| CacheError::InvalidAsset {
                        asset: asset.clone(),
                        message: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fetched = try_join_all(requests.into_iter().map(|request| async move {
            let asset = request.path().to_string();
            let response = self
                .network
                .fetch(request.clone())
                .await
                .map_err(|source| CacheError::InstallFailed {
                    asset: asset.clone(),
                    source,
                })?;
            if !response.is_success() {
                return Err(CacheError::InstallFailed {
                    asset,
                    source: FetchError::Status {
                        url: request.url.to_string(),
                        status: response.status.as_u16(),
                    },
                });
            }
            Ok((request, response))
        }))
        .await?;

        let partition = self.storage.open(&self.names.name(PartitionKind::Static)).await;
        for (request, response) in &fetched {
            partition.put(request, response.clone()).await;
        }
        tracing::info!("[Cache] pre-cached {} shell assets into {}", fetched.len(), partition.name());
        Ok(fetched.len())
    }

    /// Delete partitions from other versions; returns the deleted names
    pub async fn activate(&self) -> Vec<String> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if !self.names.is_current(&name) && self.storage.delete(&name).await {
                tracing::info!("[Cache] deleting stale partition {}", name);
                deleted.push(name);
            }
        }
        deleted
    }
}
