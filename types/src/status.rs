//! Voting-session status values carried by control records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the voting session.
///
/// `Reset` and `NewVotingCreated` are sentinels that only ever appear on
/// stored control records; the projected status they produce is always
/// [`VotingStatus::NotStarted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    NotStarted,
    Started,
    Closed,
    Reset,
    NewVotingCreated,
}

impl VotingStatus {
    /// Whether this status is a reset sentinel ("treat as not-started").
    pub fn is_reset_sentinel(&self) -> bool {
        matches!(self, Self::Reset | Self::NewVotingCreated)
    }

    /// Whether ballots may be cast under this status.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Started)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Started => "started",
            Self::Closed => "closed",
            Self::Reset => "reset",
            Self::NewVotingCreated => "new_voting_created",
        }
    }
}

impl fmt::Display for VotingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
