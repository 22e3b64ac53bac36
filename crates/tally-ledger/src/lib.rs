//! # tally-ledger
//!
//! The authoritative voting ledger.
//!
//! [`VotingLedger`] owns every piece of state (candidates, voters, the voting
//! window, the admin identity) and enforces all transitions:
//!
//! - Candidate registry with stable indices and tombstone deactivation
//! - Admin-configured voting window, evaluated against the caller's clock
//! - One vote per identity, applied atomically with the tally
//! - Consistent snapshots, a monotonic state version and a change feed
//!
//! Every mutating operation takes a [`CallContext`] carrying the already
//! authenticated caller and the timestamp of the call. Mutations are
//! serialized by one write lock and committed to the [`LedgerStore`] before
//! they become visible.
//!
//! ## Usage
//!
//! ```
//! use tally_ledger::{CallContext, VotingLedger};
//! use tally_primitives::Address;
//!
//! let admin = Address::from_bytes([1; 20]);
//! let voter = Address::from_bytes([2; 20]);
//! let ledger = VotingLedger::in_memory(admin).unwrap();
//!
//! let alice = ledger
//!     .add_candidate(&CallContext::new(admin, 0), "Alice", "https://img/alice.png")
//!     .unwrap();
//! ledger
//!     .set_voting_period(&CallContext::new(admin, 0), 100, 200)
//!     .unwrap();
//! ledger.vote(&CallContext::new(voter, 150), alice).unwrap();
//!
//! assert_eq!(ledger.get_candidate(alice).unwrap().vote_count, 1);
//! ```
//!
//! [`LedgerStore`]: tally_storage::LedgerStore

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod context;
mod error;
mod ledger;
mod receipt;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::CallContext;
pub use error::{LedgerError, LedgerResult};
pub use ledger::VotingLedger;
pub use receipt::{CallOutcome, CallReceipt};
pub use snapshot::LedgerSnapshot;
