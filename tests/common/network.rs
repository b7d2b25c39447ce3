//! Scripted in-memory network
//!
//! Answers requests by URL path from a script. A path can hold a sequence
//! of behaviours; each request consumes one and the last one repeats.
//! Unscripted paths answer `404`. Switching the network offline makes
//! every fetch fail the way a dropped connection does.

use bytes::Bytes;
use ecotravel::error::FetchError;
use ecotravel::network::{Method, Network, Request, Response, StatusCode};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const ORIGIN: &str = "http://origin.test";
pub const SYNC_PATH: &str = "/api/entries";

pub const SHELL_ASSETS: [&str; 6] = [
    "/",
    "/index.html",
    "/static/js/bundle.js",
    "/static/css/main.css",
    "/offline.html",
    "/manifest.json",
];

/// What the network does for one request
#[derive(Debug, Clone)]
pub enum Behavior {
    Respond(u16, String),
    Fail,
    /// Never answers
    Hang,
}

impl Behavior {
    pub fn ok(body: &str) -> Self {
        Behavior::Respond(200, body.to_string())
    }
}

/// A request as the network saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub host: Option<String>,
    pub path: String,
    pub body: Option<Bytes>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        let body = self.body.clone().unwrap_or_default();
        serde_json::from_slice(&body).expect("request body is JSON")
    }
}

#[derive(Default)]
pub struct ScriptedNetwork {
    script: Mutex<HashMap<String, VecDeque<Behavior>>>,
    offline: AtomicBool,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Network that serves every application-shell asset
    pub fn serving_shell() -> Arc<Self> {
        let network = Self::new();
        for asset in SHELL_ASSETS {
            network.script(asset, [Behavior::ok(&format!("shell {}", asset))]);
        }
        network
    }

    /// Replace the behaviours for `path`
    pub fn script(&self, path: &str, behaviors: impl IntoIterator<Item = Behavior>) {
        self.script
            .lock()
            .unwrap()
            .insert(path.to_string(), behaviors.into_iter().collect());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// Requests with `method` to `path`
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn next(&self, path: &str) -> Behavior {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Behavior::Respond(404, String::new())),
            None => Behavior::Respond(404, String::new()),
        }
    }
}

impl Network for ScriptedNetwork {
    fn fetch(&self, request: Request) -> BoxFuture<'_, Result<Response, FetchError>> {
        let url = request.url.to_string();
        self.log.lock().unwrap().push(Recorded {
            method: request.method.clone(),
            host: request.url.host_str().map(str::to_string),
            path: request.path().to_string(),
            body: request.body.clone(),
        });

        let behavior = if self.offline.load(Ordering::SeqCst) {
            Behavior::Fail
        } else {
            self.next(request.path())
        };

        async move {
            match behavior {
                Behavior::Respond(status, body) => {
                    let status = StatusCode::from_u16(status).expect("valid status");
                    Ok(Response::new(status, body))
                }
                Behavior::Fail => Err(FetchError::network(url, "connection refused")),
                Behavior::Hang => std::future::pending().await,
            }
        }
        .boxed()
    }
}
