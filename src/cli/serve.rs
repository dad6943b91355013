//! Serve command: run the read-only HTTP API until Ctrl-C

use anyhow::{Context, Result};

use growquest::server::{ApiState, start_http_server};

use super::Session;

pub async fn serve_command(session: Session, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(session.config.settings.server.port);
    let state = ApiState {
        tracker: session.tracker,
        token: session.config.settings.server.token.clone(),
    };

    let handle = start_http_server(state, port)?;
    println!("Serving on http://{} (Ctrl-C to stop)", handle.addr());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("[growquest:http] Shutting down");
    tokio::task::spawn_blocking(move || handle.shutdown())
        .await
        .context("Server shutdown task failed")?;
    Ok(())
}
