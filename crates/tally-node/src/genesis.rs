//! Genesis handling for tally-node

use crate::config::GenesisConfig;
use tally_ledger::{CallContext, LedgerError, VotingLedger};
use tally_primitives::Address;
use tally_types::{is_valid_name, VotingPeriod};
use thiserror::Error;

/// Genesis error types
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Invalid genesis configuration
    #[error("invalid genesis config: {0}")]
    InvalidConfig(String),
    /// Ledger rejected a genesis entry
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result type for genesis operations
pub type GenesisResult<T> = Result<T, GenesisError>;

/// Applies a [`GenesisConfig`] to a fresh ledger
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    /// Create a new genesis builder
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    /// Check every entry before anything is written
    pub fn validate(&self) -> GenesisResult<()> {
        for (i, candidate) in self.config.candidates.iter().enumerate() {
            if !is_valid_name(&candidate.name) {
                return Err(GenesisError::InvalidConfig(format!(
                    "candidate #{} has an empty name",
                    i
                )));
            }
        }
        if let Some(period) = self.config.voting_period {
            if VotingPeriod::new(period.start, period.end).is_none() {
                return Err(GenesisError::InvalidConfig(format!(
                    "voting period end {} must be after start {}",
                    period.end, period.start
                )));
            }
        }
        Ok(())
    }

    /// Register genesis candidates and window as `admin` in one commit.
    ///
    /// Returns `false` without writing when the ledger already has history.
    pub fn init_genesis(&self, ledger: &VotingLedger, admin: Address) -> GenesisResult<bool> {
        self.validate()?;

        let candidates: Vec<(String, String)> = self
            .config
            .candidates
            .iter()
            .map(|c| (c.name.clone(), c.image.clone()))
            .collect();
        let period = self
            .config
            .voting_period
            .and_then(|p| VotingPeriod::new(p.start, p.end));

        let ctx = CallContext::new(admin, 0);
        match ledger.apply_genesis(&ctx, &candidates, period)? {
            Some(version) => {
                tracing::info!(
                    candidates = candidates.len(),
                    version,
                    "Genesis state initialized"
                );
                Ok(true)
            }
            None => {
                tracing::debug!(version = ledger.version(), "ledger has history, skipping genesis");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenesisCandidate, GenesisPeriod};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tally_storage::{
        LedgerStore, MemoryStore, PersistedState, StateChanges, StorageError, StorageResult,
    };

    /// Store whose `fail_on`-th commit (1-based) is rejected
    struct FlakyStore {
        inner: MemoryStore,
        commits: AtomicUsize,
        fail_on: usize,
    }

    impl FlakyStore {
        fn new(fail_on: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                commits: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    impl LedgerStore for FlakyStore {
        fn load(&self) -> StorageResult<Option<PersistedState>> {
            self.inner.load()
        }

        fn commit(&self, changes: &StateChanges) -> StorageResult<()> {
            if self.commits.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(StorageError::WriteRejected("injected failure".to_string()));
            }
            self.inner.commit(changes)
        }
    }

    fn admin() -> Address {
        Address::from_bytes([0xad; 20])
    }

    fn config() -> GenesisConfig {
        GenesisConfig {
            admin: Some(admin()),
            candidates: vec![
                GenesisCandidate {
                    name: "Alice".into(),
                    image: "a.png".into(),
                },
                GenesisCandidate {
                    name: "Bob".into(),
                    image: String::new(),
                },
            ],
            voting_period: Some(GenesisPeriod { start: 100, end: 200 }),
        }
    }

    #[test]
    fn test_init_genesis() {
        let ledger = VotingLedger::in_memory(admin()).unwrap();
        assert!(GenesisBuilder::new(config()).init_genesis(&ledger, admin()).unwrap());

        assert_eq!(ledger.total_candidates(), 2);
        assert_eq!(ledger.get_candidate(0).unwrap().image_ref, "a.png");
        assert_eq!(ledger.voting_period().start_time, 100);
        assert_eq!(ledger.version(), 1);
    }

    #[test]
    fn test_genesis_skipped_on_existing_ledger() {
        let ledger = VotingLedger::in_memory(admin()).unwrap();
        let builder = GenesisBuilder::new(config());
        builder.init_genesis(&ledger, admin()).unwrap();

        assert!(!builder.init_genesis(&ledger, admin()).unwrap());
        assert_eq!(ledger.total_candidates(), 2);
    }

    #[test]
    fn test_invalid_genesis_writes_nothing() {
        let ledger = VotingLedger::in_memory(admin()).unwrap();
        let mut bad = config();
        bad.candidates.push(GenesisCandidate {
            name: " ".into(),
            image: String::new(),
        });
        assert!(matches!(
            GenesisBuilder::new(bad).init_genesis(&ledger, admin()),
            Err(GenesisError::InvalidConfig(_))
        ));

        let mut bad = config();
        bad.voting_period = Some(GenesisPeriod { start: 5, end: 5 });
        assert!(GenesisBuilder::new(bad).init_genesis(&ledger, admin()).is_err());

        assert_eq!(ledger.version(), 0);
    }

    #[test]
    fn test_interrupted_genesis_is_retried_on_restart() {
        // Commit 1 initializes the store, commit 2 is the genesis batch
        let store = Arc::new(FlakyStore::new(2));
        let builder = GenesisBuilder::new(config());

        let ledger = VotingLedger::open(store.clone(), admin()).unwrap();
        assert!(matches!(
            builder.init_genesis(&ledger, admin()),
            Err(GenesisError::Ledger(LedgerError::Storage(_)))
        ));
        drop(ledger);

        let ledger = VotingLedger::open(store, admin()).unwrap();
        assert_eq!(ledger.version(), 0);
        assert_eq!(ledger.total_candidates(), 0);

        assert!(builder.init_genesis(&ledger, admin()).unwrap());
        assert_eq!(ledger.total_candidates(), 2);
        assert_eq!(ledger.voting_period().end_time, 200);
        assert_eq!(ledger.version(), 1);
    }
}
