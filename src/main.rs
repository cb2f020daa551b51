//! # Tomato LCA Service
//!
//! Serves the HTTP API on `LCA_BIND_ADDR`, backed by the engine at
//! `LCA_IPC_HOST:LCA_IPC_PORT`. Stops on Ctrl-C after in-flight requests finish.

use anyhow::Context;
use tomato_lca::config::LcaConfig;
use tomato_lca::lifecycle::{setup_tracing, LcaSystem};
use tomato_lca::server::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = LcaConfig::from_env()?;
    let system = LcaSystem::connect(&config)?;
    let app = router(AppState::from(&system));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, engine = %config.ipc_endpoint(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    Ok(())
}
