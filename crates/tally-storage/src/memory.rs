//! In-memory store

use crate::error::{StorageError, StorageResult};
use crate::store::{LedgerStore, PersistedState, StateChanges};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Volatile [`LedgerStore`]; state is lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Option<PersistedState>>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty, uninitialized store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail until re-enabled
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> StorageResult<Option<PersistedState>> {
        Ok(self.state.read().clone())
    }

    fn commit(&self, changes: &StateChanges) -> StorageResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected("memory store is read-only".to_string()));
        }

        let mut guard = self.state.write();
        match guard.as_mut() {
            Some(state) => state.apply(changes),
            None => {
                let admin = changes.admin().ok_or(StorageError::NotInitialized)?;
                let mut state = PersistedState::genesis(admin);
                state.apply(changes);
                *guard = Some(state);
            }
        }
        Ok(())
    }
}
