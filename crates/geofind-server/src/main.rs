mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use geofind_catalog::CatalogClient;
use geofind_discovery::DiscoveryService;
use geofind_geo::{GeoIndex, InMemoryGeoIndex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = geofind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let index: Arc<dyn GeoIndex> = Arc::new(InMemoryGeoIndex::new());
    let catalog = Arc::new(CatalogClient::with_retry_policy(
        &config.catalog_url,
        config.catalog_timeout_secs,
        config.catalog_max_retries,
        config.catalog_retry_backoff_base_ms,
    )?);
    let discovery = DiscoveryService::new(index, catalog);

    let _scheduler = scheduler::build_scheduler(discovery.clone(), &config).await?;

    let app = build_app(AppState { discovery });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "geofind server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
