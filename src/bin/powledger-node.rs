#![forbid(unsafe_code)]
//! HTTP node for PowLedger

use clap::Parser;
use std::sync::Arc;

use powledger::config::{load_config, load_config_from, DEFAULT_CONFIG_PATH};
use powledger::node::{init_tracing, Node};

#[derive(Parser, Debug)]
#[command(version, about = "Serve a proof-of-work ledger over HTTP", long_about = None)]
struct Args {
    /// Path to the TOML configuration file (defaults to `config.toml`)
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides the configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of leading zero hex characters a proof digest needs
    #[arg(short, long)]
    difficulty: Option<usize>,

    /// Identifier credited with mining rewards
    #[arg(long)]
    node_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(port) = args.port {
        config.network.api_port = port;
    }
    if let Some(difficulty) = args.difficulty {
        config.miner.difficulty = difficulty;
    }
    if args.node_id.is_some() {
        config.node.id = args.node_id;
    }
    config.validate()?;

    init_tracing(config.log_level()?);
    tracing::info!(
        config = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH),
        "starting PowLedger node"
    );

    let node = Arc::new(Node::from_config(config));
    node.start().await?;

    Ok(())
}
