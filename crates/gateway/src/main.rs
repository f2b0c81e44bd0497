//! Fuglelitt API Gateway
//!
//! HTTP entry point for the ornithology literature catalog.
//! Handles:
//! - Request routing for browse, edit and search operations
//! - Acting-user extraction from the authentication proxy
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;
mod query_string;
mod routes;

use anyhow::Context;
use fuglelitt_common::{
    catalog::{Catalog, CatalogStore},
    config::AppConfig,
    db, metrics,
};
use fuglelitt_search::FacetedSearch;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Catalog,
    pub search: FacetedSearch,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn CatalogStore>) -> Self {
        let catalog = Catalog::new(store, config.catalog.clone());
        let search = FacetedSearch::new(config.catalog.search_page_size);
        Self {
            config: Arc::new(config),
            catalog,
            search,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    info!(
        service = %config.observability.service_name,
        "Starting Fuglelitt API Gateway v{}",
        fuglelitt_common::VERSION
    );

    init_metrics(&config)?;

    // Open the catalog store (Postgres or in-memory)
    let store = db::open_store(&config.database)
        .await
        .context("Failed to open catalog store")?;
    if config.uses_memory_store() {
        warn!("Catalog data lives in memory and is lost on shutdown");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let shutdown_timeout = config.shutdown_timeout();

    let app = routes::create_router(AppState::new(config, store));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// RUST_LOG wins over `observability.log_level`
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Prometheus listener on `observability.metrics_port`; 0 disables it
fn init_metrics(config: &AppConfig) -> anyhow::Result<()> {
    let port = config.observability.metrics_port;
    if port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets(metrics::LATENCY_BUCKETS)
        .context("Invalid histogram buckets")?
        .install()
        .context("Failed to install Prometheus exporter")?;

    metrics::register_metrics();
    info!(port, "Metrics exporter listening");
    Ok(())
}

/// Exit status when in-flight requests outlive the shutdown grace period
const FORCED_EXIT_CODE: i32 = 1;

/// Graceful shutdown signal handler
async fn shutdown_signal(grace: std::time::Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }

    // In-flight requests get `grace` before the process is forced down
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(?grace, code = FORCED_EXIT_CODE, "Shutdown grace period elapsed, forcing exit");
        std::process::exit(FORCED_EXIT_CODE);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_shutdown_exits_with_failure() {
        assert_ne!(FORCED_EXIT_CODE, 0);
    }
}
