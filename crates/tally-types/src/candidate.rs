//! Candidate registry entry

use tally_primitives::CandidateIndex;

/// A registered candidate.
///
/// Candidates are never erased. Deactivation clears `active` but keeps the
/// index and the tally, so every recorded `choice_index` keeps pointing at the
/// candidate it was cast for.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Candidate {
    /// Stable, monotonically assigned index
    pub index: CandidateIndex,
    /// Display name (non-empty)
    pub name: String,
    /// Opaque image reference, typically a URL
    pub image_ref: String,
    /// Number of votes cast for this candidate
    pub vote_count: u64,
    /// Whether the candidate still accepts votes
    pub active: bool,
}

impl Candidate {
    /// Create a fresh, active candidate with no votes
    pub fn new(index: CandidateIndex, name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            image_ref: image_ref.into(),
            vote_count: 0,
            active: true,
        }
    }

    /// A copy of this candidate with `active` cleared
    pub fn deactivated(&self) -> Self {
        Self {
            active: false,
            ..self.clone()
        }
    }

    /// A copy of this candidate with one more vote
    pub fn with_vote(&self) -> Self {
        Self {
            vote_count: self.vote_count + 1,
            ..self.clone()
        }
    }
}

/// Returns true if `name` is acceptable as a candidate name
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}
