use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pageserve::config::{Cli, RESERVED_PORT_MAX, ServerConfig};
use pageserve::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(&cli).context("invalid configuration")?;

    init_tracing(config.debug());

    if config.is_reserved_port() {
        warn!(
            port = config.port(),
            "ports 0..={RESERVED_PORT_MAX} are reserved by the operating system"
        );
    }

    let server = Server::listen(config.port())
        .await
        .with_context(|| format!("could not listen on port {}", config.port()))?;
    info!(
        port = server.local_addr().port(),
        docroot = %config.document_root().display(),
        debug = config.debug(),
        "starting page server"
    );

    server.run(Arc::new(config)).await;
    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when the config asks for it.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
