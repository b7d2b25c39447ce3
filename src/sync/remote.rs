//! Remote sync endpoint

use crate::error::FetchError;
use crate::network::{Network, Request, Url};
use crate::shared::activity::Activity;
use std::sync::Arc;

/// `POST` target for persisted activities
#[derive(Clone)]
pub struct SyncEndpoint {
    network: Arc<dyn Network>,
    url: Url,
}

impl SyncEndpoint {
    pub fn new(network: Arc<dyn Network>, url: Url) -> Self {
        Self { network, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one activity; only a 2xx answer counts as delivered
    pub async fn push(&self, activity: &Activity) -> Result<(), FetchError> {
        let request = Request::post_json(self.url.clone(), activity)?;
        let response = self.network.fetch(request).await?;
        if !response.is_success() {
            tracing::warn!("[Sync] endpoint rejected activity {} with {}", activity.id, response.status);
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: response.status.as_u16(),
            });
        }
        tracing::debug!("[Sync] activity {} delivered", activity.id);
        Ok(())
    }
}

impl std::fmt::Debug for SyncEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEndpoint").field("url", &self.url.as_str()).finish()
    }
}
