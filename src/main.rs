use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wavefront_server::config::ServerConfig;
use wavefront_server::lobby::registry::SessionRegistry;
use wavefront_server::metrics::Metrics;
use wavefront_server::net::rooms::RoomHub;
use wavefront_server::net::router::Router;
use wavefront_server::net::transport::WebTransportServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Wavefront Server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load_or_default();
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    info!(
        "Configuration loaded: {}:{}, tick={}ms",
        config.bind_address, config.port, config.tick_rate_ms
    );

    let metrics = Arc::new(Metrics::new());

    #[cfg(feature = "metrics_endpoint")]
    {
        let metrics = metrics.clone();
        let port = config.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = wavefront_server::metrics::start_metrics_server(metrics, port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    // Shared state
    let hub = Arc::new(RoomHub::with_metrics(metrics.clone()));
    let registry = Arc::new(RwLock::new(
        SessionRegistry::new(hub.clone(), config.tick_rate_ms).with_metrics(metrics.clone()),
    ));
    let router = Router::new(registry.clone(), hub).with_metrics(metrics.clone());

    let server = WebTransportServer::new(config.clone(), router, metrics).await?;
    info!("Server ready on https://{}", server.bind_addr());

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    registry.write().await.shutdown_all();
    info!("Server stopped");

    Ok(())
}
