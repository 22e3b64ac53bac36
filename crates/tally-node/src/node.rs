//! Node orchestration for tally-node

use crate::config::NodeConfig;
use crate::genesis::GenesisBuilder;
use std::future::Future;
use std::sync::Arc;
use tally_ledger::{Clock, LedgerError, SystemClock, VotingLedger};
use tally_rpc::{RpcContext, RpcHandler, RpcServer, ServerConfig};
use tally_storage::{Database, LedgerDb, LedgerStore, MemoryStore};
use thiserror::Error;

/// Node error types
#[derive(Debug, Error)]
pub enum NodeError {
    /// Storage error
    #[error("storage error: {0}")]
    Storage(#[from] tally_storage::StorageError),
    /// Ledger error
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    /// Genesis error
    #[error("genesis error: {0}")]
    Genesis(#[from] crate::genesis::GenesisError),
    /// RPC server error
    #[error("rpc error: {0}")]
    Rpc(#[from] tally_rpc::RpcError),
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Tally node
pub struct Node {
    config: NodeConfig,
    ledger: Arc<VotingLedger>,
    clock: Arc<dyn Clock>,
    database: Option<Arc<LedgerDb>>,
}

impl Node {
    /// Open the store, load or initialize the ledger and apply genesis
    pub fn new(config: NodeConfig) -> NodeResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Node::new`] with a custom time source
    pub fn with_clock(config: NodeConfig, clock: Arc<dyn Clock>) -> NodeResult<Self> {
        let database = if config.ephemeral {
            tracing::warn!("Running with an in-memory ledger; state is lost on exit");
            None
        } else {
            std::fs::create_dir_all(&config.datadir)?;
            let db = Database::new(config.datadir.join("db"));
            db.open()?;
            Some(Arc::new(LedgerDb::new(db)))
        };
        let store: Arc<dyn LedgerStore> = match &database {
            Some(ledger_db) => ledger_db.clone(),
            None => Arc::new(MemoryStore::new()),
        };

        let ledger = Arc::new(VotingLedger::open(store, config.admin)?);
        GenesisBuilder::new(config.genesis.clone()).init_genesis(&ledger, config.admin)?;

        Ok(Self {
            config,
            ledger,
            clock,
            database,
        })
    }

    /// Get the ledger
    pub fn ledger(&self) -> &Arc<VotingLedger> {
        &self.ledger
    }

    /// Build the shared context for RPC handlers
    pub fn create_rpc_context(&self) -> RpcContext {
        RpcContext::new(self.ledger.clone(), self.clock.clone())
    }

    /// Run until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> NodeResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Starting Tally node...");
        tracing::info!("Admin: {}", self.config.admin);
        if !self.config.ephemeral {
            tracing::info!("Data directory: {:?}", self.config.datadir);
        }
        tracing::info!(
            "Ledger at version {} with {} candidates",
            self.ledger().version(),
            self.ledger().total_candidates()
        );

        let feed = tokio::spawn(log_versions(self.ledger.clone()));

        let result = if self.config.rpc.enabled {
            let rpc = &self.config.rpc;
            let server_config = ServerConfig {
                listen_addr: rpc.listen_addr,
                max_body_size: rpc.max_body_size,
                ..ServerConfig::default()
            };
            let server = RpcServer::new(server_config, RpcHandler::new(Arc::new(self.create_rpc_context())));
            server.run_until(shutdown).await.map_err(NodeError::from)
        } else {
            shutdown.await;
            Ok(())
        };

        feed.abort();
        if let Some(db) = &self.database {
            db.close();
        }
        tracing::info!("Tally node stopped at version {}", self.ledger.version());
        result
    }
}

/// Follow the ledger change feed
async fn log_versions(ledger: Arc<VotingLedger>) {
    let mut rx = ledger.subscribe();
    while rx.changed().await.is_ok() {
        let version = *rx.borrow_and_update();
        tracing::debug!(version, total_votes = ledger.total_votes(), "ledger advanced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenesisCandidate, GenesisConfig, GenesisPeriod, RpcConfig};
    use tally_ledger::{CallContext, ManualClock};
    use tally_primitives::Address;
    use tempfile::TempDir;

    fn admin() -> Address {
        Address::from_hex("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
    }

    fn test_config(dir: &TempDir) -> NodeConfig {
        NodeConfig {
            datadir: dir.path().to_path_buf(),
            ephemeral: false,
            admin: admin(),
            rpc: RpcConfig {
                enabled: false,
                ..RpcConfig::default()
            },
            genesis: GenesisConfig {
                admin: None,
                candidates: vec![GenesisCandidate {
                    name: "Alice".into(),
                    image: String::new(),
                }],
                voting_period: Some(GenesisPeriod { start: 100, end: 200 }),
            },
        }
    }

    #[test]
    fn test_node_creation_applies_genesis() {
        let dir = TempDir::new().unwrap();
        let node = Node::new(test_config(&dir)).unwrap();

        assert_eq!(node.ledger().admin(), admin());
        assert_eq!(node.ledger().total_candidates(), 1);
        assert_eq!(node.ledger().voting_period().end_time, 200);
    }

    #[test]
    fn test_node_restart_keeps_state_and_skips_genesis() {
        let dir = TempDir::new().unwrap();
        {
            let node = Node::new(test_config(&dir)).unwrap();
            node.ledger()
                .vote(&CallContext::new(Address::from_bytes([7; 20]), 150), 0)
                .unwrap();
        }

        let node = Node::new(test_config(&dir)).unwrap();
        assert_eq!(node.ledger().total_candidates(), 1);
        assert_eq!(node.ledger().get_candidate(0).unwrap().vote_count, 1);
        assert_eq!(node.ledger().version(), 2);
    }

    #[test]
    fn test_node_rejects_other_admin() {
        let dir = TempDir::new().unwrap();
        Node::new(test_config(&dir)).unwrap();

        let mut config = test_config(&dir);
        config.admin = Address::from_bytes([1; 20]);
        assert!(matches!(
            Node::new(config),
            Err(NodeError::Ledger(LedgerError::AdminMismatch { .. }))
        ));
    }

    #[test]
    fn test_ephemeral_node_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.datadir = dir.path().join("unused");
        config.ephemeral = true;

        let node = Node::new(config).unwrap();
        assert_eq!(node.ledger().total_candidates(), 1);
        assert!(!dir.path().join("unused").exists());
    }

    #[tokio::test]
    async fn test_rpc_context_uses_node_clock() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(150));
        let node = Node::with_clock(test_config(&dir), clock).unwrap();

        let ctx = node.create_rpc_context();
        assert_eq!(ctx.clock.now(), 150);
        assert_eq!(ctx.ledger.version(), node.ledger().version());
    }

    #[tokio::test]
    async fn test_run_without_rpc_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let node = Node::new(test_config(&dir)).unwrap();
        let ledger = node.ledger().clone();
        node.run(async {}).await.unwrap();

        // Database is closed on shutdown, so writes through a stale handle fail
        assert!(matches!(
            ledger.vote(&CallContext::new(Address::from_bytes([7; 20]), 150), 0),
            Err(LedgerError::Storage(_))
        ));
        drop(ledger);

        let node = Node::new(test_config(&dir)).unwrap();
        assert_eq!(node.ledger().total_candidates(), 1);
    }
}
