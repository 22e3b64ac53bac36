//! # tally-primitives
//!
//! Primitive types for the Tally voting ledger.
//!
//! This crate provides the fundamental data types used throughout the system.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

/// Seconds since the Unix epoch
pub type Timestamp = u64;

/// Stable, zero-based candidate identifier
pub type CandidateIndex = u64;

/// Monotonic ledger state version
pub type StateVersion = u64;
