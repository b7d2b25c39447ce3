//! # Caching Strategies
//!
//! [`PolicyEngine`] answers intercepted requests. Each strategy either
//! returns a response or a [`FetchError`]; the only failures that are
//! recovered here are the navigation (offline page) and listing-route
//! (`[]`) fallbacks.
//!
//! Non-2xx network responses are returned to the caller as they are but
//! never cached.

use crate::cache::classifier::{RequestClassifier, Strategy};
use crate::cache::names::{CacheNames, PartitionKind};
use crate::cache::{CacheStorage, Partition};
use crate::error::FetchError;
use crate::network::{Network, Request, Response, Url};
use crate::shared::config::{AppConfig, ConfigError};
use std::sync::Arc;

/// Request classification plus strategy execution
#[derive(Clone)]
pub struct PolicyEngine {
    pub(crate) storage: Arc<CacheStorage>,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) names: CacheNames,
    pub(crate) classifier: RequestClassifier,
    pub(crate) origin: Url,
    pub(crate) offline_page: String,
    pub(crate) listing_route: String,
}

impl PolicyEngine {
    pub fn new(config: &AppConfig, storage: Arc<CacheStorage>, network: Arc<dyn Network>) -> Result<Self, ConfigError> {
        Ok(Self {
            storage,
            network,
            names: CacheNames::new(config.cache_version.clone()),
            classifier: RequestClassifier::from_config(config),
            origin: config.origin()?,
            offline_page: config.offline_page.clone(),
            listing_route: config.listing_route.clone(),
        })
    }

    pub fn names(&self) -> &CacheNames {
        &self.names
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    pub fn classify(&self, request: &Request) -> Strategy {
        self.classifier.classify(request)
    }

    /// Classify `request` and run the selected strategy
    pub async fn handle(&self, request: Request) -> Result<Response, FetchError> {
        let strategy = self.classify(&request);
        tracing::debug!("[Cache] {} {} -> {:?}", request.method, request.url, strategy);
        match strategy {
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(&request).await,
            Strategy::NetworkFirst(kind) => self.network_first(&request, kind).await,
            Strategy::CacheFirst | Strategy::Navigation => self.cache_first(&request).await,
        }
    }

    async fn partition(&self, kind: PartitionKind) -> Arc<Partition> {
        self.storage.open(&self.names.name(kind)).await
    }

    /// Cached copy of the offline page, searched across all partitions
    pub async fn offline_page(&self) -> Option<Response> {
        let url = self.origin.join(&self.offline_page).ok()?;
        self.storage.match_any(&Request::get(url)).await
    }

    /// Cache hit, else network (cached into the static partition on success)
    ///
    /// Also the navigation rule: a navigation the network cannot answer
    /// gets the cached offline page.
    pub async fn cache_first(&self, request: &Request) -> Result<Response, FetchError> {
        if let Some(cached) = self.storage.match_any(request).await {
            tracing::debug!("[Cache] hit {}", request.url);
            return Ok(cached);
        }

        match self.network.fetch(request.clone()).await {
            Ok(response) => {
                if response.is_success() {
                    self.partition(PartitionKind::Static)
                        .await
                        .put(request, response.clone())
                        .await;
                }
                Ok(response)
            }
            Err(err) if request.is_navigation() => {
                tracing::warn!("[Cache] navigation to {} failed offline: {}", request.url, err);
                self.offline_page().await.ok_or(FetchError::OfflinePageUnavailable {
                    path: self.offline_page.clone(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Cached copy right away plus a detached refresh; foreground fetch on a miss
    pub async fn stale_while_revalidate(&self, request: &Request) -> Result<Response, FetchError> {
        let images = self.partition(PartitionKind::Images).await;

        if let Some(cached) = self.storage.match_any(request).await {
            let network = Arc::clone(&self.network);
            let refresh = request.clone();
            tokio::spawn(async move {
                match network.fetch(refresh.clone()).await {
                    Ok(response) if response.is_success() => {
                        images.put(&refresh, response).await;
                    }
                    Ok(response) => {
                        tracing::debug!("[Cache] refresh of {} returned {}", refresh.url, response.status);
                    }
                    Err(err) => {
                        tracing::debug!("[Cache] refresh of {} failed: {}", refresh.url, err);
                    }
                }
            });
            return Ok(cached);
        }

        let response = self.network.fetch(request.clone()).await?;
        if response.is_success() {
            images.put(request, response.clone()).await;
        }
        Ok(response)
    }

    /// Network, else the partition's cached copy, else `[]` for the listing route
    pub async fn network_first(&self, request: &Request, kind: PartitionKind) -> Result<Response, FetchError> {
        let partition = self.partition(kind).await;

        match self.network.fetch(request.clone()).await {
            Ok(response) => {
                if response.is_success() {
                    partition.put(request, response.clone()).await;
                }
                Ok(response)
            }
            Err(err) => {
                if let Some(cached) = partition.match_request(request).await {
                    tracing::info!("[Cache] network failed, serving cached {}", request.url);
                    return Ok(cached);
                }
                if request.url.as_str().contains(self.listing_route.as_str()) {
                    tracing::info!("[Cache] network failed, serving empty listing for {}", request.url);
                    return Ok(Response::empty_json_list());
                }
                Err(err)
            }
        }
    }
}
