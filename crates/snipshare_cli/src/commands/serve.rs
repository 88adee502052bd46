//! The `serve` command.

use snipshare_core::SnippetService;
use snipshare_server::{ServerConfig, WebhookServer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs the identity-webhook server until interrupted.
pub fn run(
    bind: SocketAddr,
    secret_env: &str,
    tolerance_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    // Missing secret is a startup-class failure: refuse to serve.
    let secret = std::env::var(secret_env).map_err(|_| {
        format!("{secret_env} is not set; refusing to serve the webhook route unverified")
    })?;

    let config = ServerConfig::new(bind)
        .with_secret(secret)
        .with_tolerance(Duration::from_secs(tolerance_secs));
    let service = Arc::new(SnippetService::new());
    let server = WebhookServer::new(config, service)?;

    info!(%bind, "starting webhook server");
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}
