//! The projected application state.

use plenum_records::{
    ActiveProposalRecord, AdminAccountRecord, ClassificationRuleRecord,
    ProposalImportConfigRecord, ProposalRecord, RosterConfigRecord, VoteRecord,
    VoterAccountRecord,
};
use plenum_types::{Phase, RecordId, Timestamp, VotingStatus};
use serde::{Deserialize, Serialize};

/// Placeholder shown while no proposal has been selected.
pub const DEFAULT_BODY_TEXT: &str =
    "Select a proposal in the admin panel to start the voting round.";
/// Placeholder axis label shown while no proposal has been selected.
pub const DEFAULT_AXIS_LABEL: &str = "Proposal axis";

/// Resolved voting-session control state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub status: VotingStatus,
    pub phase: Phase,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            status: VotingStatus::NotStarted,
            phase: Phase::default(),
            started_at: None,
            ended_at: None,
        }
    }
}

/// The currently selected proposal: the pointer's denormalized display text
/// plus the registered proposal it references, when that still exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSelection {
    pub pointer: ActiveProposalRecord,
    pub proposal: Option<ProposalRecord>,
}

/// Everything the application derives from the record log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedState {
    pub votes: Vec<VoteRecord>,
    pub proposals: Vec<ProposalRecord>,
    pub voter_accounts: Vec<VoterAccountRecord>,
    pub admin_accounts: Vec<AdminAccountRecord>,
    pub classification_rules: Vec<ClassificationRuleRecord>,
    pub control: ControlState,
    pub active: Option<ActiveSelection>,
    pub roster_config: Option<RosterConfigRecord>,
    pub import_config: Option<ProposalImportConfigRecord>,
}

impl ProjectedState {
    /// Whether this voter already holds a ballot on this proposal.
    pub fn has_voted(&self, voter_id: &str, proposal_id: &RecordId) -> bool {
        self.votes
            .iter()
            .any(|v| v.voter_id == voter_id && &v.proposal_id == proposal_id)
    }

    /// All ballots cast on the given proposal.
    pub fn votes_for(&self, proposal_id: &RecordId) -> Vec<&VoteRecord> {
        self.votes
            .iter()
            .filter(|v| &v.proposal_id == proposal_id)
            .collect()
    }

    /// Look up a registered proposal by id.
    pub fn find_proposal(&self, id: &RecordId) -> Option<&ProposalRecord> {
        self.proposals.iter().find(|p| &p.id == id)
    }

    /// The registered proposal currently selected for voting, if any.
    pub fn active_proposal(&self) -> Option<&ProposalRecord> {
        self.active.as_ref()?.proposal.as_ref()
    }
}
