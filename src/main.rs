//! desklink - MCP server for the service desk
//!
//! This binary hosts the desk client behind an MCP server using stdio
//! transport, so an assistant can work tickets and the ML pipeline
//! through tools.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `DESK_PAGE_ORIGIN`: origin the backend is served from (optional;
//!   defaults to `http://127.0.0.1:8000` when unset or not HTTP)
//! - `DESK_SESSION_FILE`: where the session is kept between runs
//!   (default `.desklink-session.json`)
//!
//! # Usage
//!
//! ```bash
//! DESK_PAGE_ORIGIN=https://desk.example.com ./desklink
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use desklink::{config, desk_client, server, session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout is reserved for MCP JSON-RPC messages
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("desklink=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting desklink MCP server v{}", env!("CARGO_PKG_VERSION"));

    let host = config::HostConfig::from_env().context("Failed to load host configuration")?;
    let config = config::Config::resolve(&host.origin_source());

    tracing::info!(base_url = %config.base_url, "Backend base address resolved");

    let storage = Arc::new(session::FileStorage::new(&host.session_file));
    let client = desk_client::DeskClient::new(&config, storage)
        .context("Failed to create desk client")?;

    // A stored session may have expired while we were not running
    if client.is_authenticated() {
        match client.get_me().await {
            Ok(_) => tracing::info!("Resumed stored session"),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("Stored session was rejected; log in again with the login tool");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not verify stored session. Check DESK_PAGE_ORIGIN and network connectivity."
                );
            }
        }
    }

    let server = server::DeskServer::new(client);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
