//! Configuration types for tally-node

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tally_primitives::{Address, Timestamp};
use tally_rpc::server::DEFAULT_LISTEN_ADDR;

/// Node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory
    pub datadir: PathBuf,
    /// Keep the ledger in memory only
    pub ephemeral: bool,
    /// Admin identity
    pub admin: Address,
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Initial ledger contents
    pub genesis: GenesisConfig,
}

/// RPC server configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Whether RPC is enabled
    pub enabled: bool,
    /// Listen address
    pub listen_addr: SocketAddr,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: DEFAULT_LISTEN_ADDR,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Genesis configuration, applied only to an empty store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Admin address; `--admin` takes precedence
    #[serde(default)]
    pub admin: Option<Address>,
    /// Candidates registered in order, indices from 0
    #[serde(default)]
    pub candidates: Vec<GenesisCandidate>,
    /// Initial voting window
    #[serde(default)]
    pub voting_period: Option<GenesisPeriod>,
}

/// Candidate entry in the genesis file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisCandidate {
    /// Display name
    pub name: String,
    /// Image reference
    #[serde(default)]
    pub image: String,
}

/// Voting window in the genesis file
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenesisPeriod {
    /// Window start, seconds since epoch
    pub start: Timestamp,
    /// Window end, seconds since epoch
    pub end: Timestamp,
}

/// Load genesis configuration from file
pub fn load_genesis_file(path: &Path) -> anyhow::Result<GenesisConfig> {
    tracing::info!("Loading genesis from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let genesis: GenesisConfig = serde_json::from_str(&content)?;
    Ok(genesis)
}
