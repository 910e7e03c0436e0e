//! `DigitalOcean` MCP server binary.

use anyhow::Result;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use do_mcp::{rpc_loop, Dispatcher, McpConfig, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("do_mcp=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = McpConfig::from_env();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_url = %config.api_url,
        "Starting DigitalOcean MCP server"
    );

    let server = McpServer::new(Dispatcher::new(config.client_factory()));
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    tokio::select! {
        result = rpc_loop(&server, reader, writer) => result?,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
