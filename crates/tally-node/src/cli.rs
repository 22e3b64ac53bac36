//! CLI argument parsing for tally-node

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Tally voting ledger node
#[derive(Parser, Debug, Clone)]
#[command(name = "tally")]
#[command(about = "Tally voting ledger node")]
#[command(version)]
pub struct Cli {
    /// Data directory for ledger storage
    #[arg(long, default_value = "./data")]
    pub datadir: PathBuf,

    /// Keep the ledger in memory only; nothing is written to --datadir
    #[arg(long)]
    pub ephemeral: bool,

    /// RPC server listen address
    #[arg(long, default_value = "127.0.0.1:8645")]
    pub rpc_addr: SocketAddr,

    /// Enable RPC server (use --rpc=false to disable)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub rpc: bool,

    /// Maximum RPC request body size in bytes
    #[arg(long, default_value = "1048576")]
    pub max_body_size: usize,

    /// Genesis file path
    #[arg(long)]
    pub genesis: Option<PathBuf>,

    /// Admin address; overrides the genesis file
    #[arg(long)]
    pub admin: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
