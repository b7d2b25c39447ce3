//! Gateway error types

use crate::error::{CacheError, FetchError, StoreError, SyncError, WorkerError};
use crate::shared::SharedError;
use axum::http::StatusCode;
use thiserror::Error;

/// Any failure a gateway handler can report
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request itself is unusable
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// HTTP status for this error
    ///
    /// - a request that got no response at all: `504 Gateway Timeout`
    /// - remote endpoint refused an entry: `502 Bad Gateway`
    /// - store or worker missing, or offline force-sync: `503 Service Unavailable`
    /// - invalid input: `400 Bad Request`
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Fetch(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Store(err) => store_status(err),
            Self::Sync(err) => sync_status(err),
            Self::Worker(err) => match err {
                WorkerError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                WorkerError::Fetch(_) => StatusCode::GATEWAY_TIMEOUT,
                WorkerError::Cache(CacheError::InvalidAsset { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
                WorkerError::Cache(CacheError::InstallFailed { .. }) => StatusCode::BAD_GATEWAY,
                WorkerError::Sync(err) => sync_status(err),
            },
            Self::Shared(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn sync_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::Store(err) => store_status(err),
        SyncError::Remote { .. } => StatusCode::BAD_GATEWAY,
        SyncError::Offline | SyncError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let fetch = FetchError::network("http://origin.test/", "connection refused");
        assert_eq!(GatewayError::from(fetch.clone()).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            GatewayError::from(WorkerError::Fetch(fetch)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayError::from(SyncError::Offline).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::from(StoreError::Invalid(SharedError::validation("description", "empty"))).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::bad_request("nope").status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_fields_are_client_errors() {
        let invalid = SharedError::validation("type", "unknown activity type 'diving'");
        assert_eq!(GatewayError::from(invalid.clone()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::from(SyncError::Store(StoreError::Invalid(invalid))).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
