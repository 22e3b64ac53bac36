//! Ledger error types

use tally_primitives::{Address, CandidateIndex};
use tally_storage::StorageError;
use tally_types::Phase;
use thiserror::Error;

/// Ledger operation errors. A failed operation never changes state.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller lacks the admin role
    #[error("caller {caller} is not the admin")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },

    /// Malformed input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown candidate, or inactive where an active one is required
    #[error("candidate {0} not found")]
    NotFound(CandidateIndex),

    /// Identity has already voted
    #[error("{0} has already voted")]
    AlreadyVoted(Address),

    /// Candidate was already deactivated
    #[error("candidate {0} is already inactive")]
    AlreadyInactive(CandidateIndex),

    /// Vote outside the open window
    #[error("voting is not open (phase: {phase})")]
    VotingClosed {
        /// Phase at the time of the call
        phase: Phase,
    },

    /// Store contains a ledger owned by another admin
    #[error("stored ledger belongs to admin {stored}, configured admin is {configured}")]
    AdminMismatch {
        /// Admin found in the store
        stored: Address,
        /// Admin the ledger was opened with
        configured: Address,
    },

    /// Persisted state violates the tally invariant
    #[error("inconsistent ledger state: {0}")]
    Inconsistent(String),

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
