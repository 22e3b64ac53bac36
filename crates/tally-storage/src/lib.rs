//! # tally-storage
//!
//! Durable state for the Tally voting ledger.
//!
//! This crate provides:
//! - The [`LedgerStore`] trait the ledger commits through
//! - A RocksDB backend ([`LedgerDb`]) with one column family per table
//! - An in-memory backend ([`MemoryStore`]) for tests and ephemeral nodes
//! - Atomic change sets ([`StateChanges`])

#![warn(missing_docs)]
#![warn(clippy::all)]

mod db;
mod error;
mod ledger_db;
mod memory;
mod store;

pub use db::{cf, Database, DbConfig, WriteBatchWrapper, ALL_CFS};
pub use error::{StorageError, StorageResult};
pub use ledger_db::LedgerDb;
pub use memory::MemoryStore;
pub use store::{LedgerStore, PersistedState, StateChanges};
