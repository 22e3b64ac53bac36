//! # tally-types
//!
//! Core ledger types for Tally.
//!
//! This crate provides:
//! - [`Candidate`](candidate::Candidate) - Registered candidate with its tally
//! - [`VoterRecord`](voter::VoterRecord) - Per-identity voting record
//! - [`VotingPeriod`](period::VotingPeriod) and [`Phase`](period::Phase) - The voting window
//! - [`LedgerCall`](call::LedgerCall) - Mutating operations as data, plus their signed envelope

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call;
pub mod candidate;
pub mod codec;
pub mod period;
pub mod voter;

// Re-export commonly used types
pub use call::{LedgerCall, SignedCall, CALL_DOMAIN};
pub use candidate::{is_valid_name, Candidate};
pub use period::{Phase, VotingPeriod};
pub use voter::{VoterRecord, VoterStatus};
