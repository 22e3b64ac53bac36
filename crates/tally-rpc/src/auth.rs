//! Caller authentication for mutating methods

use std::collections::HashMap;

use parking_lot::Mutex;
use tally_crypto::CryptoError;
use tally_primitives::Address;
use tally_types::SignedCall;
use thiserror::Error;
use tracing::warn;

use crate::error::JsonRpcError;

/// Authentication failure
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signature could not be recovered
    #[error("bad signature: {0}")]
    BadSignature(#[from] CryptoError),

    /// Nonce not above the last one accepted from this signer
    #[error("stale nonce {nonce} for {signer}, last accepted {last}")]
    StaleNonce {
        /// Recovered signer
        signer: Address,
        /// Nonce presented
        nonce: u64,
        /// Highest nonce already accepted
        last: u64,
    },
}

impl From<AuthError> for JsonRpcError {
    fn from(e: AuthError) -> Self {
        JsonRpcError::authentication_failed(e.to_string())
    }
}

/// Recovers signers and enforces strictly increasing nonces per signer.
///
/// A nonce is consumed once the signature checks out, whether or not the
/// ledger later accepts the call.
#[derive(Debug, Default)]
pub struct Authenticator {
    last_nonce: Mutex<HashMap<Address, u64>>,
}

impl Authenticator {
    /// Create an authenticator with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the signer of `signed` and consume its nonce
    pub fn authenticate(&self, signed: &SignedCall) -> Result<Address, AuthError> {
        let signer = signed.recover_sender().map_err(|e| {
            warn!(call = signed.call.name(), error = %e, "signature recovery failed");
            AuthError::BadSignature(e)
        })?;

        let mut last_nonce = self.last_nonce.lock();
        if let Some(&last) = last_nonce.get(&signer) {
            if signed.nonce <= last {
                warn!(%signer, nonce = signed.nonce, last, "replayed or stale nonce");
                return Err(AuthError::StaleNonce {
                    signer,
                    nonce: signed.nonce,
                    last,
                });
            }
        }
        last_nonce.insert(signer, signed.nonce);
        Ok(signer)
    }

    /// Highest nonce accepted from `signer`
    pub fn last_nonce(&self, signer: &Address) -> Option<u64> {
        self.last_nonce.lock().get(signer).copied()
    }
}
