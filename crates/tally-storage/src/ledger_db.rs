//! RocksDB-backed ledger store

use crate::db::{cf, Database};
use crate::error::{StorageError, StorageResult};
use crate::store::{LedgerStore, PersistedState, StateChanges};
use std::collections::HashMap;
use tally_primitives::Address;
use tally_types::codec::{
    decode_candidate, decode_period, decode_voter, encode_candidate, encode_period, encode_voter,
};

/// Keys in the `meta` column family
mod meta_key {
    pub const ADMIN: &[u8] = b"admin";
    pub const PERIOD: &[u8] = b"period";
    pub const VERSION: &[u8] = b"version";
}

fn corrupted(table: &'static str, reason: impl Into<String>) -> StorageError {
    StorageError::Corrupted {
        table,
        reason: reason.into(),
    }
}

/// Ledger state persisted in RocksDB
pub struct LedgerDb {
    db: Database,
}

impl LedgerDb {
    /// Wrap an opened database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Close the underlying database; later loads and commits fail
    pub fn close(&self) {
        self.db.close();
        tracing::debug!(path = self.db.path(), "ledger database closed");
    }

    fn load_candidates(&self) -> StorageResult<Vec<tally_types::Candidate>> {
        let mut candidates = Vec::new();
        for (key, value) in self.db.entries(cf::CANDIDATES)? {
            let candidate = decode_candidate(&value)
                .ok_or_else(|| corrupted(cf::CANDIDATES, format!("undecodable row {}", hex::encode(&key))))?;
            if key != candidate.index.to_be_bytes() {
                return Err(corrupted(cf::CANDIDATES, format!("key/index mismatch at {}", candidate.index)));
            }
            if candidate.index != candidates.len() as u64 {
                return Err(corrupted(cf::CANDIDATES, format!("gap before index {}", candidate.index)));
            }
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    fn load_voters(&self) -> StorageResult<HashMap<Address, tally_types::VoterRecord>> {
        let mut voters = HashMap::new();
        for (key, value) in self.db.entries(cf::VOTERS)? {
            let address = Address::from_slice(&key).map_err(|e| corrupted(cf::VOTERS, e.to_string()))?;
            let record = decode_voter(&value)
                .ok_or_else(|| corrupted(cf::VOTERS, format!("undecodable row {}", address)))?;
            voters.insert(address, record);
        }
        Ok(voters)
    }
}

impl LedgerStore for LedgerDb {
    fn load(&self) -> StorageResult<Option<PersistedState>> {
        let admin = match self.db.get(cf::META, meta_key::ADMIN)? {
            Some(bytes) => Address::from_slice(&bytes).map_err(|e| corrupted(cf::META, e.to_string()))?,
            None => return Ok(None),
        };

        let period = match self.db.get(cf::META, meta_key::PERIOD)? {
            Some(bytes) => decode_period(&bytes)
                .filter(|p| !p.is_set() || p.end_time > p.start_time)
                .ok_or_else(|| corrupted(cf::META, "voting period"))?,
            None => Default::default(),
        };

        let version = match self.db.get(cf::META, meta_key::VERSION)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| corrupted(cf::META, "state version"))?;
                u64::from_le_bytes(raw)
            }
            None => 0,
        };

        let state = PersistedState {
            admin,
            candidates: self.load_candidates()?,
            voters: self.load_voters()?,
            period,
            version,
        };
        tracing::debug!(
            candidates = state.candidates.len(),
            voters = state.voters.len(),
            version = state.version,
            "ledger state loaded"
        );
        Ok(Some(state))
    }

    fn commit(&self, changes: &StateChanges) -> StorageResult<()> {
        if changes.admin().is_none() && self.db.get(cf::META, meta_key::ADMIN)?.is_none() {
            return Err(StorageError::NotInitialized);
        }

        let mut batch = self.db.batch();

        if let Some(admin) = changes.admin() {
            batch.put(cf::META, meta_key::ADMIN, admin.as_bytes());
        }
        for candidate in changes.candidates() {
            batch.put(cf::CANDIDATES, &candidate.index.to_be_bytes(), &encode_candidate(candidate));
        }
        for (address, record) in changes.voters() {
            batch.put(cf::VOTERS, address.as_bytes(), &encode_voter(record));
        }
        if let Some(period) = changes.period() {
            batch.put(cf::META, meta_key::PERIOD, &encode_period(&period));
        }
        if let Some(version) = changes.version() {
            batch.put(cf::META, meta_key::VERSION, &version.to_le_bytes());
        }

        tracing::debug!(rows = batch.len(), version = ?changes.version(), "committing ledger batch");
        self.db.write_batch(batch)
    }
}
