//! Voter records

use tally_primitives::CandidateIndex;

/// Stored per-identity record. Only identities that have voted are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoterRecord {
    /// Whether this identity has voted
    pub voted: bool,
    /// Candidate voted for; meaningful only when `voted`
    pub choice_index: CandidateIndex,
}

impl VoterRecord {
    /// Record of a cast vote
    pub fn cast(choice_index: CandidateIndex) -> Self {
        Self {
            voted: true,
            choice_index,
        }
    }

    /// Public view of this record
    pub fn status(&self) -> VoterStatus {
        VoterStatus {
            voted: self.voted,
            choice_index: self.voted.then_some(self.choice_index),
        }
    }
}

/// Answer to a voter status query
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VoterStatus {
    /// Whether the identity has voted
    pub voted: bool,
    /// Candidate voted for, if any
    pub choice_index: Option<CandidateIndex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_has_no_choice() {
        let status = VoterRecord::default().status();
        assert!(!status.voted);
        assert_eq!(status.choice_index, None);
    }

    #[test]
    fn test_cast_status() {
        let status = VoterRecord::cast(4).status();
        assert_eq!(
            status,
            VoterStatus {
                voted: true,
                choice_index: Some(4)
            }
        );
    }
}
