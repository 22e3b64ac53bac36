//! Mutating ledger operations as data, and their signed envelope

use crate::codec::encode_call;
use tally_crypto::{keccak256_concat, recover_address, sign, CryptoError, PrivateKey, Signature};
use tally_primitives::{Address, CandidateIndex, Timestamp, H256};

/// Domain separator prepended to every signing preimage
pub const CALL_DOMAIN: &[u8] = b"tally-call:";

/// A state-changing ledger operation
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum LedgerCall {
    /// Register a new candidate (admin only)
    AddCandidate {
        /// Display name
        name: String,
        /// Opaque image reference
        #[cfg_attr(feature = "serde", serde(rename = "imageRef", default))]
        image_ref: String,
    },
    /// Tombstone a candidate (admin only)
    DeactivateCandidate {
        /// Candidate index
        index: CandidateIndex,
    },
    /// Replace the voting window (admin only)
    SetVotingPeriod {
        /// Window start
        #[cfg_attr(feature = "serde", serde(rename = "startTime"))]
        start_time: Timestamp,
        /// Window end
        #[cfg_attr(feature = "serde", serde(rename = "endTime"))]
        end_time: Timestamp,
    },
    /// Cast the caller's vote
    Vote {
        /// Candidate index
        index: CandidateIndex,
    },
}

impl LedgerCall {
    /// Short operation name, used in logs and to match RPC methods
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCall::AddCandidate { .. } => "addCandidate",
            LedgerCall::DeactivateCandidate { .. } => "deactivateCandidate",
            LedgerCall::SetVotingPeriod { .. } => "setVotingPeriod",
            LedgerCall::Vote { .. } => "vote",
        }
    }
}

/// A call authenticated by a secp256k1 signature.
///
/// The signer's address is the caller identity. `nonce` must increase per
/// signer so a captured envelope cannot be replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedCall {
    /// The operation
    pub call: LedgerCall,
    /// Per-signer sequence number
    pub nonce: u64,
    /// Signature over [`SignedCall::signing_hash`]
    pub signature: Signature,
}

impl SignedCall {
    /// keccak256(CALL_DOMAIN || encode_call(call) || nonce as big-endian u64)
    pub fn signing_hash(call: &LedgerCall, nonce: u64) -> H256 {
        keccak256_concat(&[CALL_DOMAIN, &encode_call(call), &nonce.to_be_bytes()])
    }

    /// Sign `call` with `key`
    pub fn sign(call: LedgerCall, nonce: u64, key: &PrivateKey) -> Result<Self, CryptoError> {
        let signature = sign(&Self::signing_hash(&call, nonce), key)?;
        Ok(Self {
            call,
            nonce,
            signature,
        })
    }

    /// Recover the identity that signed this envelope
    pub fn recover_sender(&self) -> Result<Address, CryptoError> {
        recover_address(&Self::signing_hash(&self.call, self.nonce), &self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_crypto::{address_of, generate_key};

    #[test]
    fn test_recover_sender() {
        let key = generate_key();
        let signed = SignedCall::sign(LedgerCall::Vote { index: 2 }, 7, &key).unwrap();
        assert_eq!(signed.recover_sender().unwrap(), address_of(&key));
    }

    #[test]
    fn test_tampered_call_changes_sender() {
        let key = generate_key();
        let mut signed = SignedCall::sign(LedgerCall::Vote { index: 2 }, 1, &key).unwrap();
        signed.call = LedgerCall::Vote { index: 3 };
        match signed.recover_sender() {
            Ok(addr) => assert_ne!(addr, address_of(&key)),
            Err(_) => {}
        }
    }

    #[test]
    fn test_nonce_is_part_of_hash() {
        let call = LedgerCall::DeactivateCandidate { index: 0 };
        assert_ne!(SignedCall::signing_hash(&call, 1), SignedCall::signing_hash(&call, 2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() {
        let call: LedgerCall = serde_json::from_str(
            r#"{"type":"addCandidate","name":"Alice","imageRef":"https://a"}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            LedgerCall::AddCandidate {
                name: "Alice".into(),
                image_ref: "https://a".into()
            }
        );

        let json = serde_json::to_value(LedgerCall::SetVotingPeriod {
            start_time: 100,
            end_time: 200,
        })
        .unwrap();
        assert_eq!(json["type"], "setVotingPeriod");
        assert_eq!(json["startTime"], 100);
        assert_eq!(json["endTime"], 200);
    }
}
