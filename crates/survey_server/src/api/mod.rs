//! HTTP routing and server lifecycle.

use crate::config::ServerConfig;
use crate::state::AppState;
use axum::Router;
use log::info;
use std::error::Error;

pub mod error;
pub mod extract;
mod health;
pub mod survey;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(survey::router())
        .with_state(state)
        .merge(health::router())
}

/// Binds the configured address and serves until ctrl-c.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=api status=ok addr={} db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_signal module=api status=error error={err}");
    }
}
