//! Application state shared by every handler

use crate::network::Url;
use crate::runtime::OfflineRuntime;
use std::sync::Arc;

/// State handed to every route
///
/// Cloning is cheap: the runtime is behind an `Arc` and the origin is only
/// parsed once.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<OfflineRuntime>,
    /// Base URL intercepted requests are resolved against
    pub origin: Url,
}

impl AppState {
    pub fn new(runtime: Arc<OfflineRuntime>, origin: Url) -> Self {
        Self { runtime, origin }
    }
}
