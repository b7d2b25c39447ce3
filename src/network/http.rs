//! reqwest-backed [`Network`] implementation

use crate::error::FetchError;
use crate::network::{Network, Request, Response};
use futures_util::future::{BoxFuture, FutureExt};
use std::time::Duration;

/// Sends requests over HTTP with a shared connection pool
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let url = request.url.to_string();
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| FetchError::network(&url, err))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| FetchError::network(&url, err))?;

        tracing::debug!("[Network] {} -> {}", url, status);
        Ok(Response { status, headers, body })
    }
}

impl Network for HttpNetwork {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, FetchError>> {
        self.send(request).boxed()
    }
}
