//! Voting window and phase computation

use std::fmt;
use tally_primitives::Timestamp;

/// Where a timestamp falls relative to the voting window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Phase {
    /// No window configured
    Unset,
    /// Before `start_time`
    NotStarted,
    /// Within `[start_time, end_time]`, both ends inclusive
    Open,
    /// After `end_time`
    Closed,
}

impl Phase {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Unset => "unset",
            Phase::NotStarted => "notStarted",
            Phase::Open => "open",
            Phase::Closed => "closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The voting window. `start_time == end_time == 0` means unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VotingPeriod {
    /// Window start, seconds since epoch
    pub start_time: Timestamp,
    /// Window end, seconds since epoch
    pub end_time: Timestamp,
}

impl VotingPeriod {
    /// The unset window
    pub const UNSET: VotingPeriod = VotingPeriod {
        start_time: 0,
        end_time: 0,
    };

    /// Build a window, requiring `end > start`
    pub fn new(start_time: Timestamp, end_time: Timestamp) -> Option<Self> {
        (end_time > start_time).then_some(Self {
            start_time,
            end_time,
        })
    }

    /// Whether a window has been configured
    pub fn is_set(&self) -> bool {
        !(self.start_time == 0 && self.end_time == 0)
    }

    /// Phase at `now`
    pub fn phase_at(&self, now: Timestamp) -> Phase {
        if !self.is_set() {
            Phase::Unset
        } else if now < self.start_time {
            Phase::NotStarted
        } else if now <= self.end_time {
            Phase::Open
        } else {
            Phase::Closed
        }
    }
}
