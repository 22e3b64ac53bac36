//! Per-call session

use crate::clock::Clock;
use tally_primitives::{Address, Timestamp};

/// Who is calling, and when.
///
/// Built fresh by the transport for every call after it has authenticated
/// the sender. The ledger trusts `sender` completely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    sender: Address,
    timestamp: Timestamp,
}

impl CallContext {
    /// Context for `sender` at `timestamp`
    pub fn new(sender: Address, timestamp: Timestamp) -> Self {
        Self { sender, timestamp }
    }

    /// Context for `sender` at the clock's current time
    pub fn at(sender: Address, clock: &dyn Clock) -> Self {
        Self::new(sender, clock.now())
    }

    /// Authenticated caller
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    /// Time of the call, seconds since epoch
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
