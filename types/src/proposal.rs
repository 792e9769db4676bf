//! Proposal lifecycle enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a registered proposal sits in its voting lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Registered, never voted. Tally fields are empty.
    #[default]
    Pending,
    /// Currently selected and in an open voting round.
    InVoting,
    /// A round was completed; tally fields and result are populated.
    Voted,
}

/// Outcome of a completed voting round.
///
/// `AbstainMajority` exists so stored records carrying it remain
/// representable; the tally itself only ever produces the first three
/// variants (strict YES-vs-NO comparison).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalResult {
    Approved,
    Rejected,
    Tie,
    AbstainMajority,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InVoting => "in_voting",
            Self::Voted => "voted",
        }
    }
}

impl ProposalResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Tie => "tie",
            Self::AbstainMajority => "abstain_majority",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ProposalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
