//! Results of mutating calls

use serde::Serialize;
use tally_primitives::{CandidateIndex, StateVersion};
use tally_types::VotingPeriod;

/// What a successful call did
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CallOutcome {
    /// A candidate was registered
    CandidateAdded {
        /// Index allocated to it
        index: CandidateIndex,
    },
    /// A candidate was tombstoned
    CandidateDeactivated {
        /// Its index
        index: CandidateIndex,
    },
    /// The voting window was replaced
    VotingPeriodSet {
        /// New window
        period: VotingPeriod,
    },
    /// A vote was recorded
    VoteCast {
        /// Candidate voted for
        index: CandidateIndex,
    },
}

/// Outcome plus the state version it produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReceipt {
    /// Version after the call
    pub version: StateVersion,
    /// What happened
    pub outcome: CallOutcome,
}
