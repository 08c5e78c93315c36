//! Entry point for the `yotc-gateway` HTTP server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use yotc_gateway::{config::GatewayConfig, routes::create_router};
use yotc_store::Clubhouse;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let hub = match Clubhouse::open(&config.store_config()).await {
        Ok(h) => Arc::new(h),
        Err(e) => {
            tracing::error!(error = %e, "failed to open store");
            std::process::exit(1);
        }
    };
    let app = create_router(hub, &config);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %config.listen_addr, blob_dir = %config.blob_dir.display(), "yotc-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
