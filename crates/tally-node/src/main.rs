//! Tally node binary
//!
//! Serves a voting ledger over JSON-RPC, persisted in RocksDB.

mod cli;
mod config;
mod genesis;
mod node;

use anyhow::{Context, Result};
use cli::Cli;
use config::{load_genesis_file, GenesisConfig, NodeConfig, RpcConfig};
use node::Node;
use tally_primitives::Address;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Tally node starting...");

    let config = build_config(cli)?;
    let node = Node::new(config)?;

    // Handle Ctrl+C for graceful shutdown
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    };

    node.run(shutdown).await?;
    Ok(())
}

/// Merge CLI flags and the genesis file into a [`NodeConfig`]
fn build_config(cli: Cli) -> Result<NodeConfig> {
    let genesis = match &cli.genesis {
        Some(path) => load_genesis_file(path)
            .with_context(|| format!("failed to load genesis file {:?}", path))?,
        None => GenesisConfig::default(),
    };

    let admin = match (&cli.admin, genesis.admin) {
        (Some(flag), _) => Address::from_hex(flag).context("invalid --admin address")?,
        (None, Some(admin)) => admin,
        (None, None) => anyhow::bail!("no admin configured: pass --admin or set it in the genesis file"),
    };

    Ok(NodeConfig {
        datadir: cli.datadir,
        ephemeral: cli.ephemeral,
        admin,
        rpc: RpcConfig {
            enabled: cli.rpc,
            listen_addr: cli.rpc_addr,
            max_body_size: cli.max_body_size,
        },
        genesis,
    })
}
