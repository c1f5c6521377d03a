//! Parley Daemon - hybrid chat responder
//!
//! Answers from the local dataset, then the local model, then the hosted
//! model, then a fixed fallback line.

use anyhow::Result;
use clap::Parser;
use parleyd::config::Config;
use parleyd::server;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parleyd", version, about = "Hybrid dataset / LLM chat server")]
struct Cli {
    /// Config file (defaults to ./parley.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// HTTP port (overrides config and $PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Bind address
    #[arg(long)]
    host: Option<String>,
    /// Dataset directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    info!("Parley Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(dir) = cli.data_dir {
        config.dataset.dir = dir;
    }

    server::run(&config).await
}
