//! # Request Classifier
//!
//! Picks exactly one caching strategy per request. Rules are checked in
//! order and the first match wins:
//!
//! 1. path ends with an application-shell asset → cache-first
//! 2. image destination or image extension → stale-while-revalidate
//! 3. path under the API prefix → network-first (api partition)
//! 4. navigation → cache-first with offline-page fallback
//! 5. anything else → network-first (dynamic partition)

use crate::cache::names::PartitionKind;
use crate::network::{Destination, Request};
use crate::shared::config::AppConfig;

/// Caching strategy selected for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from cache; network only on a miss
    CacheFirst,
    /// Serve from cache immediately and refresh in the background
    StaleWhileRevalidate,
    /// Network first; cache of the given partition on failure
    NetworkFirst(PartitionKind),
    /// Cache-first, then the offline page
    Navigation,
}

#[derive(Debug, Clone)]
pub struct RequestClassifier {
    shell_assets: Vec<String>,
    image_extensions: Vec<String>,
    api_prefix: String,
}

impl RequestClassifier {
    pub fn new(shell_assets: Vec<String>, image_extensions: Vec<String>, api_prefix: impl Into<String>) -> Self {
        Self {
            shell_assets,
            image_extensions,
            api_prefix: api_prefix.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.static_assets.clone(),
            config.image_extensions.clone(),
            config.api_prefix.clone(),
        )
    }

    /// Suffix match, so `/` also covers every directory index
    pub fn is_shell_asset(&self, path: &str) -> bool {
        self.shell_assets.iter().any(|asset| path.ends_with(asset.as_str()))
    }

    pub fn is_image(&self, request: &Request) -> bool {
        if request.destination == Destination::Image {
            return true;
        }
        match request.path().rsplit_once('.') {
            Some((_, extension)) => self.image_extensions.iter().any(|ext| ext == extension),
            None => false,
        }
    }

    pub fn is_api(&self, path: &str) -> bool {
        path.starts_with(self.api_prefix.as_str())
    }

    pub fn classify(&self, request: &Request) -> Strategy {
        let path = request.path();
        if self.is_shell_asset(path) {
            Strategy::CacheFirst
        } else if self.is_image(request) {
            Strategy::StaleWhileRevalidate
        } else if self.is_api(path) {
            Strategy::NetworkFirst(PartitionKind::Api)
        } else if request.is_navigation() {
            Strategy::Navigation
        } else {
            Strategy::NetworkFirst(PartitionKind::Dynamic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Url;

    fn classifier() -> RequestClassifier {
        RequestClassifier::from_config(&AppConfig::default())
    }

    fn get(path: &str) -> Request {
        Request::get(Url::parse("http://eco.test").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_shell_assets_are_cache_first() {
        for path in ["/", "/index.html", "/static/js/bundle.js", "/manifest.json"] {
            assert_eq!(classifier().classify(&get(path)), Strategy::CacheFirst, "{path}");
        }
    }

    #[test]
    fn test_images_by_extension_and_destination() {
        assert_eq!(classifier().classify(&get("/img/heron.webp")), Strategy::StaleWhileRevalidate);
        let avatar = get("/avatar").with_destination(Destination::Image);
        assert_eq!(classifier().classify(&avatar), Strategy::StaleWhileRevalidate);
        assert_eq!(
            classifier().classify(&get("/img/heron.PNG")),
            Strategy::NetworkFirst(PartitionKind::Dynamic)
        );
    }

    #[test]
    fn test_shell_rule_wins_over_image_rule() {
        let classifier = RequestClassifier::new(vec!["/logo.svg".into()], vec!["svg".into()], "/api/");
        assert_eq!(classifier.classify(&get("/logo.svg")), Strategy::CacheFirst);
    }

    #[test]
    fn test_api_and_navigation() {
        assert_eq!(
            classifier().classify(&get("/api/entries")),
            Strategy::NetworkFirst(PartitionKind::Api)
        );
        let page = Request::navigate(Url::parse("http://eco.test/about").unwrap());
        assert_eq!(classifier().classify(&page), Strategy::Navigation);
        assert_eq!(
            classifier().classify(&get("/fonts/inter.woff2")),
            Strategy::NetworkFirst(PartitionKind::Dynamic)
        );
    }
}
