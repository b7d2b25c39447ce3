//! Configuration, store and runtime fixtures

use super::network::{ScriptedNetwork, ORIGIN, SYNC_PATH};
use ecotravel::local_db::EntryStore;
use ecotravel::network::Connectivity;
use ecotravel::runtime::OfflineRuntime;
use ecotravel::shared::{ActivityType, AppConfig, NewActivity};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .origin_url(ORIGIN)
        .sync_endpoint(format!("{}{}", ORIGIN, SYNC_PATH))
        .build()
        .expect("valid test configuration")
}

pub fn activity(description: &str) -> NewActivity {
    NewActivity::new(description, ActivityType::Sighting).expect("valid activity")
}

/// Runtime over an in-memory store
pub fn start_runtime(network: Arc<ScriptedNetwork>, initial: Connectivity) -> OfflineRuntime {
    start_runtime_with(test_config(), network, initial)
}

pub fn start_runtime_with(config: AppConfig, network: Arc<ScriptedNetwork>, initial: Connectivity) -> OfflineRuntime {
    let store = Arc::new(EntryStore::in_memory());
    OfflineRuntime::start(config, store, network, initial).expect("runtime starts")
}

/// Installed and activated runtime, online
pub async fn active_runtime(network: Arc<ScriptedNetwork>) -> OfflineRuntime {
    let runtime = start_runtime(network, Connectivity::Online);
    runtime.install_and_activate().await.expect("worker activates");
    runtime
}

/// Poll `check` until it holds, failing the test after two seconds
pub async fn eventually<F, Fut>(description: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", description);
}
