//! Store abstraction the ledger commits through

use crate::error::StorageResult;
use std::collections::HashMap;
use tally_primitives::{Address, StateVersion};
use tally_types::{Candidate, VoterRecord, VotingPeriod};

/// Full durable image of the ledger
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// Admin identity, fixed at initialization
    pub admin: Address,
    /// Candidate table; position `i` holds index `i`
    pub candidates: Vec<Candidate>,
    /// Voter table (only identities that have voted)
    pub voters: HashMap<Address, VoterRecord>,
    /// Current voting window
    pub period: VotingPeriod,
    /// Version of the last committed mutation
    pub version: StateVersion,
}

impl PersistedState {
    /// Fresh state owned by `admin`
    pub fn genesis(admin: Address) -> Self {
        Self {
            admin,
            ..Default::default()
        }
    }

    /// Apply a change set in place
    pub fn apply(&mut self, changes: &StateChanges) {
        if let Some(admin) = changes.admin {
            self.admin = admin;
        }
        for candidate in &changes.candidates {
            let slot = candidate.index as usize;
            if slot < self.candidates.len() {
                self.candidates[slot] = candidate.clone();
            } else {
                self.candidates.push(candidate.clone());
            }
        }
        for (address, record) in &changes.voters {
            self.voters.insert(*address, *record);
        }
        if let Some(period) = changes.period {
            self.period = period;
        }
        if let Some(version) = changes.version {
            self.version = version;
        }
    }
}

/// Records written by one mutation, committed as a single atomic batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateChanges {
    admin: Option<Address>,
    candidates: Vec<Candidate>,
    voters: Vec<(Address, VoterRecord)>,
    period: Option<VotingPeriod>,
    version: Option<StateVersion>,
}

impl StateChanges {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the admin identity (initialization only)
    pub fn set_admin(mut self, admin: Address) -> Self {
        self.admin = Some(admin);
        self
    }

    /// Insert or overwrite a candidate row
    pub fn put_candidate(mut self, candidate: Candidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Insert or overwrite a voter row
    pub fn put_voter(mut self, address: Address, record: VoterRecord) -> Self {
        self.voters.push((address, record));
        self
    }

    /// Overwrite the voting window
    pub fn set_period(mut self, period: VotingPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// Stamp the change set with the version it produces
    pub fn set_version(mut self, version: StateVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Admin row, if written
    pub fn admin(&self) -> Option<Address> {
        self.admin
    }

    /// Candidate rows written
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Voter rows written
    pub fn voters(&self) -> &[(Address, VoterRecord)] {
        &self.voters
    }

    /// Voting window, if written
    pub fn period(&self) -> Option<VotingPeriod> {
        self.period
    }

    /// Version, if written
    pub fn version(&self) -> Option<StateVersion> {
        self.version
    }
}

/// Durable backend for the voting ledger.
///
/// `commit` must be all-or-nothing: after an error, a subsequent `load`
/// returns the state as it was before the call.
pub trait LedgerStore: Send + Sync {
    /// Load the persisted image, or `None` if the store was never initialized
    fn load(&self) -> StorageResult<Option<PersistedState>>;

    /// Atomically persist a change set
    fn commit(&self, changes: &StateChanges) -> StorageResult<()>;
}
