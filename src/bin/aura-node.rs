#![forbid(unsafe_code)]
//! AuraChain node: serves the ledger API and reconciles with its peers.

use aurachain::config::{load_config, DEFAULT_CONFIG_PATH};
use aurachain::node::Node;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aura-node", about = "Run an AuraChain ledger node")]
struct Cli {
    /// Port to listen on (overrides network.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Peer to register at startup; may be repeated
    #[arg(long = "peer")]
    peers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    config.network.bootstrap_peers.extend(cli.peers);

    let node = Arc::new(Node::new(config)?);
    node.start().await
}
