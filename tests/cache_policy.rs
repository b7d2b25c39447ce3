//! Request interception through the worker: install, activation and the
//! three caching strategies

mod common;

use assert_matches::assert_matches;
use common::*;
use ecotravel::cache::{CacheNames, LifecycleState, PartitionKind};
use ecotravel::error::{CacheError, FetchError, WorkerError};
use ecotravel::network::{Connectivity, Destination, Method, Request, Url, CONTENT_TYPE};
use ecotravel::shared::WorkerMessage;
use pretty_assertions::assert_eq;
use std::time::Duration;

fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

fn body(response: &ecotravel::network::Response) -> String {
    String::from_utf8(response.body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_install_precaches_shell_into_static_partition() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = active_runtime(network).await;

    assert_eq!(runtime.lifecycle(), LifecycleState::Activated);
    let status = runtime.status().await;
    let static_partition = status
        .partitions
        .iter()
        .find(|p| p.name == "static-v1")
        .expect("static partition exists");
    assert_eq!(static_partition.entries, SHELL_ASSETS.len());
}

#[tokio::test]
async fn test_failed_install_caches_nothing_and_passes_through() {
    let network = ScriptedNetwork::serving_shell();
    network.script("/static/css/main.css", [Behavior::Respond(500, String::new())]);
    let runtime = start_runtime(network.clone(), Connectivity::Online);

    let err = runtime.worker.install().await.unwrap_err();
    assert_matches!(err, WorkerError::Cache(CacheError::InstallFailed { ref asset, .. }) if asset == "/static/css/main.css");
    assert_eq!(runtime.lifecycle(), LifecycleState::Redundant);
    assert!(runtime.status().await.partitions.iter().all(|p| p.entries == 0));

    // not activated: every request goes to the network, nothing is cached
    network.set_offline(true);
    let err = runtime.worker.fetch(Request::navigate(url("/index.html"))).await.unwrap_err();
    assert_matches!(err, WorkerError::Fetch(FetchError::Network { .. }));
}

#[tokio::test]
async fn test_activation_evicts_other_versions_and_claims_clients() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = start_runtime(network, Connectivity::Online);
    runtime.storage.open("static-v0").await;
    runtime.storage.open("images-v0").await;
    let mut client = runtime.clients.subscribe();

    let evicted = runtime.install_and_activate().await.unwrap();

    assert_eq!(evicted, vec!["static-v0".to_string(), "images-v0".to_string()]);
    assert_eq!(runtime.storage.keys().await, vec!["static-v1".to_string()]);
    assert!(runtime.clients.is_claimed());
    assert_eq!(
        client.recv().await,
        Some(WorkerMessage::ControllerChange { cache_version: "v1".to_string() })
    );
}

#[tokio::test]
async fn test_shell_is_served_from_cache_while_offline() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = active_runtime(network.clone()).await;
    network.set_offline(true);

    let response = runtime.worker.fetch(Request::get(url("/static/js/bundle.js"))).await.unwrap();
    assert_eq!(body(&response), "shell /static/js/bundle.js");
}

#[tokio::test]
async fn test_offline_navigation_falls_back_to_offline_page() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = active_runtime(network.clone()).await;
    network.set_offline(true);

    let response = runtime.worker.fetch(Request::navigate(url("/journal/2025"))).await.unwrap();
    assert_eq!(body(&response), "shell /offline.html");
}

#[tokio::test]
async fn test_navigation_without_cached_offline_page_fails_once() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = active_runtime(network.clone()).await;
    let shell = runtime.storage.open("static-v1").await;
    assert!(shell.delete(&Request::get(url("/offline.html"))).await);
    network.set_offline(true);

    let err = runtime.worker.fetch(Request::navigate(url("/journal/2025"))).await.unwrap_err();

    assert_matches!(err, WorkerError::Fetch(FetchError::OfflinePageUnavailable { ref path }) if path == "/offline.html");
    assert_eq!(network.requests_to(Method::GET, "/journal/2025").len(), 1);
}

#[tokio::test]
async fn test_api_network_first_falls_back_to_cached_copy() {
    let network = ScriptedNetwork::serving_shell();
    network.script("/api/trails", [Behavior::ok(r#"["ridge"]"#)]);
    let runtime = active_runtime(network.clone()).await;

    let online = runtime.worker.fetch(Request::get(url("/api/trails"))).await.unwrap();
    assert_eq!(body(&online), r#"["ridge"]"#);

    network.set_offline(true);
    let offline = runtime.worker.fetch(Request::get(url("/api/trails"))).await.unwrap();
    assert_eq!(body(&offline), r#"["ridge"]"#);

    let api = runtime.storage.open(&CacheNames::new("v1").name(PartitionKind::Api)).await;
    assert_eq!(api.len().await, 1);
}

#[tokio::test]
async fn test_uncached_listing_route_answers_empty_list_offline() {
    let network = ScriptedNetwork::serving_shell();
    let runtime = active_runtime(network.clone()).await;
    network.set_offline(true);

    let response = runtime.worker.fetch(Request::get(url("/api/entries"))).await.unwrap();
    assert!(response.is_success());
    assert_eq!(body(&response), "[]");
    assert_eq!(response.headers[CONTENT_TYPE], "application/json");

    let err = runtime.worker.fetch(Request::get(url("/api/weather"))).await.unwrap_err();
    assert_matches!(err, WorkerError::Fetch(FetchError::Network { .. }));
}

#[tokio::test]
async fn test_images_are_served_stale_and_refreshed() {
    let network = ScriptedNetwork::serving_shell();
    network.script("/photos/heron.webp", [Behavior::ok("first"), Behavior::ok("second")]);
    let runtime = active_runtime(network.clone()).await;
    let request = Request::get(url("/photos/heron.webp")).with_destination(Destination::Image);

    let first = runtime.worker.fetch(request.clone()).await.unwrap();
    assert_eq!(body(&first), "first");

    // cached copy right away, refresh in the background
    let stale = runtime.worker.fetch(request.clone()).await.unwrap();
    assert_eq!(body(&stale), "first");

    let images = runtime.storage.open("images-v1").await;
    eventually("the image refresh", || {
        let images = images.clone();
        let request = request.clone();
        async move {
            images
                .match_request(&request)
                .await
                .is_some_and(|cached| cached.body.as_ref() == b"second")
        }
    })
    .await;
}

#[tokio::test]
async fn test_cached_image_never_waits_on_the_network() {
    let network = ScriptedNetwork::serving_shell();
    network.script("/photos/lynx.png", [Behavior::ok("first"), Behavior::Hang]);
    let runtime = active_runtime(network.clone()).await;
    let request = Request::get(url("/photos/lynx.png")).with_destination(Destination::Image);

    let first = runtime.worker.fetch(request.clone()).await.unwrap();
    assert_eq!(body(&first), "first");

    // the refresh hangs in the background; the cached copy is already answered
    let stalled = tokio::time::timeout(Duration::from_millis(500), runtime.worker.fetch(request.clone()))
        .await
        .expect("cached image answered without waiting")
        .unwrap();
    assert_eq!(body(&stalled), "first");

    network.set_offline(true);
    let offline = runtime.worker.fetch(request.clone()).await.unwrap();
    assert_eq!(body(&offline), "first");
}

#[tokio::test]
async fn test_non_get_and_error_responses_are_not_cached() {
    let network = ScriptedNetwork::serving_shell();
    network.script("/api/trails", [Behavior::Respond(503, "busy".to_string())]);
    network.script("/api/photos", [Behavior::Respond(201, "{}".to_string())]);
    let runtime = active_runtime(network.clone()).await;

    let unavailable = runtime.worker.fetch(Request::get(url("/api/trails"))).await.unwrap();
    assert_eq!(unavailable.status.as_u16(), 503);

    let post = Request::post_json(url("/api/photos"), &serde_json::json!({"name": "heron"})).unwrap();
    let created = runtime.worker.fetch(post).await.unwrap();
    assert_eq!(created.status.as_u16(), 201);
    assert_eq!(network.requests_to(Method::POST, "/api/photos").len(), 1);

    let api = runtime.storage.open("api-v1").await;
    assert!(api.is_empty().await);
}
