//! EcoTravel gateway entry point
//!
//! Starts the offline runtime, installs and activates the worker, then
//! serves the gateway on the configured listen address.

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use ecotravel::local_db::EntryStore;
    use ecotravel::network::{Connectivity, HttpNetwork};
    use ecotravel::runtime::OfflineRuntime;
    use ecotravel::shared::AppConfig;
    use std::sync::Arc;
    use std::time::Duration;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();
    ecotravel::logging::init_tracing("info");

    let config = AppConfig::load()?;
    tracing::info!("[Startup] origin {}, sync endpoint {}", config.origin_url, config.sync_endpoint);

    let network = Arc::new(HttpNetwork::new(Duration::from_secs(config.request_timeout_secs))?);
    let store = Arc::new(EntryStore::from_config(&config));
    let listen_addr = config.listen_addr.clone();

    let runtime = Arc::new(OfflineRuntime::start(config, store, network, Connectivity::Online)?);
    match runtime.install_and_activate().await {
        Ok(evicted) => tracing::info!("[Startup] worker active, {} stale partitions evicted", evicted.len()),
        // requests still reach the origin, just without caching
        Err(err) => tracing::error!("[Startup] worker install failed: {}", err),
    }

    let app = ecotravel::backend::create_app(runtime)?;

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("[Startup] listening on http://{}", listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("The gateway requires the 'server' feature to be enabled.");
    eprintln!("Run with: cargo run --bin ecotravel-gateway --features server");
    std::process::exit(1);
}
