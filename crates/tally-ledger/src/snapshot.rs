//! Point-in-time view of the whole ledger

use serde::Serialize;
use tally_primitives::{Address, StateVersion};
use tally_types::{Candidate, VotingPeriod};

/// Everything a display layer renders, read under one lock
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// State version the snapshot reflects
    pub version: StateVersion,
    /// Admin identity
    pub admin: Address,
    /// Voting window
    pub period: VotingPeriod,
    /// All candidates, ascending index, including inactive ones
    pub candidates: Vec<Candidate>,
    /// Number of identities that have voted
    pub total_votes: u64,
}
