use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tally_api::server;
use tally_core::config::Config;
use tally_core::core_rpc::MethodDispatcher;
use tally_core::core_store::RemoteStore;
use tally_core::logging::{init_logging_with_config, LogConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tally-api")]
#[command(version, about = "Single-endpoint JSON scoring service", long_about = None)]
struct Args {
    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Append logs to this file instead of stdout
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Load configuration from a TOML file (environment otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    if let Some(port) = args.port {
        config.server.bind_address.set_port(port);
    }
    if args.log.is_some() {
        config.logging.log_file = args.log.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    init_logging_with_config(LogConfig::from(&config.logging))?;

    let store = Arc::new(RemoteStore::new(config.store.clone()));
    let dispatcher = Arc::new(MethodDispatcher::new(store));

    info!(store = %config.store.addr(), "starting server at {}", config.server.bind_address);
    server::run(config.server.bind_address, dispatcher).await
}
