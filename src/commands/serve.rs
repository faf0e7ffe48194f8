use crate::api::Mode;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::server::build_router;
use crate::{Config, Ledger, Result};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Handles the `serve` command: connects to the spreadsheet and serves the HTTP API until the
/// process receives Ctrl-C.
pub async fn serve(config: Config, mode: Mode) -> Result<Out<()>> {
    let ledger = Ledger::connect(&config, mode).await?;
    let router = build_router(ledger, config.cors());

    let address = (config.host(), config.port());
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Unable to listen on {}:{}", config.host(), config.port()))
        .pub_result(ErrorType::Config)?;
    let local_addr = listener.local_addr().pub_result(ErrorType::Service)?;
    info!("Listening on http://{local_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server stopped unexpectedly")
        .pub_result(ErrorType::Service)?;

    Ok(Out::new_message("Server stopped"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
