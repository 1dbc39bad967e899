//! HTTP server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tally_core::core_rpc::MethodDispatcher;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::build_router;

/// Serve the method router until interrupted
pub async fn run(addr: SocketAddr, dispatcher: Arc<MethodDispatcher>) -> Result<()> {
    let router = build_router(dispatcher);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(error = %err, "failed to install the shutdown handler"),
    }
}
