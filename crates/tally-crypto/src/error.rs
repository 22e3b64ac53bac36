//! Errors raised while signing calls or recovering their signer

use thiserror::Error;

/// Signing or signer-recovery failure
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key could not sign the call hash
    #[error("could not sign call: {0}")]
    Signing(String),

    /// Wrong length, bad hex, out-of-range scalars or high-s
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// `v` does not map to recovery id 0 or 1
    #[error("recovery id {0} is not 0 or 1")]
    BadRecoveryId(u8),

    /// No public key matches the signature and hash
    #[error("could not recover signer: {0}")]
    SignerRecovery(String),
}
