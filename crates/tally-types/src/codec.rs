//! Binary encoding for persisted records and call signing.
//!
//! Integers are little-endian; strings are a u32 length followed by UTF-8
//! bytes. Used by `tally-storage` for column values and by [`SignedCall`]
//! for the signing preimage, so the layout must stay stable.
//!
//! [`SignedCall`]: crate::call::SignedCall

use crate::call::LedgerCall;
use crate::candidate::Candidate;
use crate::period::VotingPeriod;
use crate::voter::VoterRecord;

// ============================================================================
// Helpers
// ============================================================================

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn string(&mut self) -> Option<String> {
        let len = u32::from_le_bytes(self.take(4)?.try_into().ok()?) as usize;
        String::from_utf8(self.take(len)?.to_vec()).ok()
    }

    fn bool(&mut self) -> Option<bool> {
        match self.u8()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    fn finish<T>(self, value: T) -> Option<T> {
        (self.pos == self.bytes.len()).then_some(value)
    }
}

// ============================================================================
// Candidate
// ============================================================================

/// Encode a candidate.
pub fn encode_candidate(c: &Candidate) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + 8 + 1 + 8 + c.name.len() + c.image_ref.len());
    buf.extend_from_slice(&c.index.to_le_bytes());
    buf.extend_from_slice(&c.vote_count.to_le_bytes());
    buf.push(c.active as u8);
    put_str(&mut buf, &c.name);
    put_str(&mut buf, &c.image_ref);
    buf
}

/// Decode a candidate.
pub fn decode_candidate(bytes: &[u8]) -> Option<Candidate> {
    let mut r = Reader::new(bytes);
    let index = r.u64()?;
    let vote_count = r.u64()?;
    let active = r.bool()?;
    let name = r.string()?;
    let image_ref = r.string()?;
    r.finish(Candidate {
        index,
        name,
        image_ref,
        vote_count,
        active,
    })
}

// ============================================================================
// Voter
// ============================================================================

/// Encode a voter record (9 bytes).
pub fn encode_voter(v: &VoterRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9);
    buf.push(v.voted as u8);
    buf.extend_from_slice(&v.choice_index.to_le_bytes());
    buf
}

/// Decode a voter record.
pub fn decode_voter(bytes: &[u8]) -> Option<VoterRecord> {
    let mut r = Reader::new(bytes);
    let voted = r.bool()?;
    let choice_index = r.u64()?;
    r.finish(VoterRecord {
        voted,
        choice_index,
    })
}

// ============================================================================
// Voting period
// ============================================================================

/// Encode a voting period (16 bytes).
pub fn encode_period(p: &VotingPeriod) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    buf.extend_from_slice(&p.start_time.to_le_bytes());
    buf.extend_from_slice(&p.end_time.to_le_bytes());
    buf
}

/// Decode a voting period.
pub fn decode_period(bytes: &[u8]) -> Option<VotingPeriod> {
    let mut r = Reader::new(bytes);
    let start_time = r.u64()?;
    let end_time = r.u64()?;
    r.finish(VotingPeriod {
        start_time,
        end_time,
    })
}

// ============================================================================
// Calls
// ============================================================================

const TAG_ADD_CANDIDATE: u8 = 0x01;
const TAG_DEACTIVATE_CANDIDATE: u8 = 0x02;
const TAG_SET_VOTING_PERIOD: u8 = 0x03;
const TAG_VOTE: u8 = 0x04;

/// Encode a call: one tag byte followed by its fields.
pub fn encode_call(call: &LedgerCall) -> Vec<u8> {
    let mut buf = Vec::new();
    match call {
        LedgerCall::AddCandidate { name, image_ref } => {
            buf.push(TAG_ADD_CANDIDATE);
            put_str(&mut buf, name);
            put_str(&mut buf, image_ref);
        }
        LedgerCall::DeactivateCandidate { index } => {
            buf.push(TAG_DEACTIVATE_CANDIDATE);
            buf.extend_from_slice(&index.to_le_bytes());
        }
        LedgerCall::SetVotingPeriod {
            start_time,
            end_time,
        } => {
            buf.push(TAG_SET_VOTING_PERIOD);
            buf.extend_from_slice(&start_time.to_le_bytes());
            buf.extend_from_slice(&end_time.to_le_bytes());
        }
        LedgerCall::Vote { index } => {
            buf.push(TAG_VOTE);
            buf.extend_from_slice(&index.to_le_bytes());
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_layout() {
        let c = Candidate {
            index: 1,
            name: "Bob".into(),
            image_ref: "b.png".into(),
            vote_count: 3,
            active: false,
        };
        let bytes = encode_candidate(&c);
        assert_eq!(bytes.len(), 8 + 8 + 1 + 4 + 3 + 4 + 5);
        assert_eq!(decode_candidate(&bytes), Some(c));
    }

    #[test]
    fn test_candidate_unicode_name() {
        let c = Candidate::new(0, "Zoë Ångström", "");
        assert_eq!(decode_candidate(&encode_candidate(&c)), Some(c));
    }

    #[test]
    fn test_truncated_input_rejected() {
        let bytes = encode_candidate(&Candidate::new(0, "Alice", "a"));
        for cut in 0..bytes.len() {
            assert!(decode_candidate(&bytes[..cut]).is_none(), "cut at {}", cut);
        }
        assert!(decode_voter(&[1, 0, 0]).is_none());
        assert!(decode_period(&[0u8; 15]).is_none());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_voter(&VoterRecord::cast(2));
        bytes.push(0);
        assert!(decode_voter(&bytes).is_none());
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let mut bytes = encode_voter(&VoterRecord::cast(2));
        bytes[0] = 2;
        assert!(decode_voter(&bytes).is_none());
    }

    #[test]
    fn test_call_encoding_distinguishes_variants() {
        let vote = encode_call(&LedgerCall::Vote { index: 5 });
        let deactivate = encode_call(&LedgerCall::DeactivateCandidate { index: 5 });
        assert_ne!(vote, deactivate);
        assert_eq!(vote[0], TAG_VOTE);
        assert_eq!(&vote[1..], &5u64.to_le_bytes());
    }

    #[test]
    fn test_period_decode() {
        let p = VotingPeriod::new(100, 200).unwrap();
        assert_eq!(decode_period(&encode_period(&p)), Some(p));
    }
}
