//! HTTP server command handler.

use std::net::SocketAddr;

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::http;

use super::App;

impl App {
    /// Run the HTTP API until the listener fails.
    pub async fn run_serve(&self, host: Option<&str>, port: Option<u16>) -> Result<()> {
        tracing::info!("Starting perfume-db HTTP server");

        let mut config = Config::load()?;
        if let Some(host) = host {
            config.server.host = host.to_string();
        }
        if let Some(port) = port {
            config.server.port = port;
        }

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                color_eyre::eyre::eyre!(
                    "Invalid address {}:{}: {}",
                    config.server.host,
                    config.server.port,
                    e
                )
            })?;

        tracing::info!(pool_size = config.postgres.pool_size, "Configuring PostgreSQL pool");
        let ctx = Context::from_config(config).await?;
        match ctx.db.client().ping().await {
            Ok(()) => tracing::info!("Connected to PostgreSQL"),
            Err(e) => tracing::warn!(error = %e, "PostgreSQL not reachable, serving anyway"),
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("perfume-db listening on http://{}", addr);

        axum::serve(listener, http::router(ctx)).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            color_eyre::eyre::eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}
