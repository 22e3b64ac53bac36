//! RPC method implementations

pub mod client;
pub mod ledger;
