//! Cycle de vie du serveur HTTP
//!
//! Démarre le listener, sert le routeur et s'arrête proprement à la
//! réception d'un signal d'interruption : le listener cesse d'accepter,
//! les requêtes en cours se terminent, puis la fonction rend la main.

use anyhow::Result;

use crate::api::create_router;
use crate::state::AppState;

/// Sert l'API jusqu'au signal d'arrêt
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
