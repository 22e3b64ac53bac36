//! # tally-crypto
//!
//! Cryptographic building blocks for authenticating ledger callers.
//!
//! - Keccak-256 hashing
//! - ECDSA signing/verification (secp256k1, low-s only)
//! - Public key recovery and address derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::{keccak256, keccak256_concat};
pub use signature::{
    address_of, generate_key, public_key_to_address, recover_address, recover_public_key, sign,
    verify, PrivateKey, PublicKey, Signature,
};
