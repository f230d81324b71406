use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use tributario_api::config::Cli;
use tributario_api::logging::init_logging;
use tributario_api::{AppState, app};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_file.as_deref())?;

    let state = AppState::new();
    let source = cli.table_source();
    match state.load_tables(source.as_ref()).await {
        Ok(meta) => info!(source = %meta.source, "loaded default tax tables"),
        // The service still starts; readiness stays 503 until an upload.
        Err(error) => warn!(
            source = %source.describe(),
            %error,
            "could not load default tax tables"
        ),
    }

    let address = cli.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "listening");

    axum::serve(listener, app(state)).await.context("server error")?;

    Ok(())
}
