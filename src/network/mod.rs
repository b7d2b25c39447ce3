//! # Network Layer
//!
//! Request/response values flowing through the interception engine, the
//! [`Network`] seam every outgoing request goes through, and connectivity
//! tracking.
//!
//! ## Key Components
//!
//! - [`Request`] / [`Response`]: owned, cloneable HTTP values. Headers,
//!   methods and status codes are the `http` types re-exported by `reqwest`,
//!   which are the same ones axum uses.
//! - [`Network`]: an object-safe fetch interface. [`http::HttpNetwork`] is
//!   the reqwest-backed implementation; tests script their own.
//! - [`connectivity::ConnectivityMonitor`]: online/offline state.

pub mod connectivity;
pub mod http;

pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use http::HttpNetwork;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
pub use reqwest::{Method, StatusCode, Url};

use crate::error::FetchError;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::Serialize;

/// What the requested resource will be used for (`Sec-Fetch-Dest`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    #[default]
    Empty,
    Other,
}

impl Destination {
    /// Parse a `Sec-Fetch-Dest` header value
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" => Destination::Document,
            "image" => Destination::Image,
            "script" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            "" | "empty" => Destination::Empty,
            _ => Destination::Other,
        }
    }
}

/// Request mode (`Sec-Fetch-Mode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Full-page navigation
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

impl RequestMode {
    /// Parse a `Sec-Fetch-Mode` header value
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigate" => RequestMode::Navigate,
            "same-origin" => RequestMode::SameOrigin,
            "no-cors" => RequestMode::NoCors,
            _ => RequestMode::Cors,
        }
    }
}

/// An outgoing resource request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub destination: Destination,
    pub mode: RequestMode,
}

impl Request {
    /// Plain `GET` request
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
            destination: Destination::Empty,
            mode: RequestMode::Cors,
        }
    }

    /// Full-page navigation to `url`
    pub fn navigate(url: Url) -> Self {
        Self::get(url)
            .with_destination(Destination::Document)
            .with_mode(RequestMode::Navigate)
    }

    /// `POST` with a JSON-encoded body
    pub fn post_json<T: Serialize + ?Sized>(url: Url, value: &T) -> Result<Self, FetchError> {
        let body = serde_json::to_vec(value).map_err(|err| FetchError::InvalidBody {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            method: Method::POST,
            url,
            headers,
            body: Some(Bytes::from(body)),
            destination: Destination::Empty,
            mode: RequestMode::Cors,
        })
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// URL path component
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Key under which a response to this request is cached
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// A response, either from the network or from a cache partition
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `200 OK` with the given body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// `200 OK`, `application/json`, body `[]`
    pub fn empty_json_list() -> Self {
        Self::ok("[]").with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// `true` for 2xx statuses
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }
}

/// Fetch interface shared by interception and sync delivery
///
/// A `FetchError` means the request produced no response at all. Any
/// response, whatever its status, is `Ok`.
pub trait Network: Send + Sync + 'static {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, FetchError>>;
}
