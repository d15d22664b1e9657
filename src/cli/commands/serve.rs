use anyhow::{anyhow, Result};
use clap::Args;
use tracing::{info, warn};

use super::{open_database, timing_source};
use crate::adapters::http::{AppState, HttpServer};
use crate::domain::models::{AuthConfig, Config};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind, overriding server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding server.port
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    if config.auth.secret_key == AuthConfig::default().secret_key {
        warn!("auth.secret_key is the built-in default; set PITLINE_AUTH__SECRET_KEY in production");
    }

    let pool = open_database(config).await?;
    let state = AppState::new(pool.clone(), config, timing_source(config)?);

    HttpServer::new(state, server_config)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("server error: {e}"))?;

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
    }
}
