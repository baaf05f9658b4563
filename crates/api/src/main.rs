//! Used-Car Price Server - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Used-car resale price prediction server
#[derive(Parser, Debug)]
#[command(name = "carprice-server")]
#[command(version)]
#[command(about = "Serve used-car price predictions over HTTP", long_about = None)]
struct Args {
    /// Configuration file path (optional; CARPRICE__* variables override it)
    #[arg(short, long, default_value = "carprice.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    info!("=== Used-Car Price Server v{} ===", env!("CARGO_PKG_VERSION"));
    let config = ServerConfig::load(&args.config)?;

    // Refuses to start without a valid model bundle
    run_server(config).await
}
