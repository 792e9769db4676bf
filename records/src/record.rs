//! Record types — the tagged union stored in the shared event log.
//!
//! The wire/storage form is a JSON object carrying a `kind` tag plus the
//! variant's fields inline. Ids are unique within a kind's namespace and
//! never reused. Votes are immutable once written; control records, active
//! pointers and configs are append-only with latest-wins resolution.

use plenum_types::{
    AdminPermissions, Phase, ProposalResult, ProposalStatus, RecordId, Timestamp, VoteChoice,
    VotingStatus,
};
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Record`], matching the JSON `kind` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Vote,
    Proposal,
    Control,
    ActiveProposal,
    RosterConfig,
    ProposalImportConfig,
    VoterAccount,
    AdminAccount,
    ClassificationRule,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::Proposal => "proposal",
            Self::Control => "control",
            Self::ActiveProposal => "active_proposal",
            Self::RosterConfig => "roster_config",
            Self::ProposalImportConfig => "proposal_import_config",
            Self::VoterAccount => "voter_account",
            Self::AdminAccount => "admin_account",
            Self::ClassificationRule => "classification_rule",
        }
    }
}

/// One tagged, immutable-once-written unit in the event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Vote(VoteRecord),
    Proposal(ProposalRecord),
    Control(ControlRecord),
    ActiveProposal(ActiveProposalRecord),
    RosterConfig(RosterConfigRecord),
    ProposalImportConfig(ProposalImportConfigRecord),
    VoterAccount(VoterAccountRecord),
    AdminAccount(AdminAccountRecord),
    ClassificationRule(ClassificationRuleRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Vote(_) => RecordKind::Vote,
            Self::Proposal(_) => RecordKind::Proposal,
            Self::Control(_) => RecordKind::Control,
            Self::ActiveProposal(_) => RecordKind::ActiveProposal,
            Self::RosterConfig(_) => RecordKind::RosterConfig,
            Self::ProposalImportConfig(_) => RecordKind::ProposalImportConfig,
            Self::VoterAccount(_) => RecordKind::VoterAccount,
            Self::AdminAccount(_) => RecordKind::AdminAccount,
            Self::ClassificationRule(_) => RecordKind::ClassificationRule,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Self::Vote(r) => &r.id,
            Self::Proposal(r) => &r.id,
            Self::Control(r) => &r.id,
            Self::ActiveProposal(r) => &r.id,
            Self::RosterConfig(r) => &r.id,
            Self::ProposalImportConfig(r) => &r.id,
            Self::VoterAccount(r) => &r.id,
            Self::AdminAccount(r) => &r.id,
            Self::ClassificationRule(r) => &r.id,
        }
    }

    /// The timestamp used for latest-wins resolution of singleton categories.
    pub fn recorded_at(&self) -> Timestamp {
        match self {
            Self::Vote(r) => r.cast_at,
            Self::Proposal(r) => r.created_at,
            Self::Control(r) => r.recorded_at,
            Self::ActiveProposal(r) => r.recorded_at,
            Self::RosterConfig(r) => r.recorded_at,
            Self::ProposalImportConfig(r) => r.recorded_at,
            Self::VoterAccount(r) => r.recorded_at,
            Self::AdminAccount(r) => r.recorded_at,
            Self::ClassificationRule(r) => r.recorded_at,
        }
    }
}

/// One ballot. Never mutated; deleted only by the explicit per-proposal
/// vote-reset admin action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: RecordId,
    pub voter_id: String,
    pub proposal_id: RecordId,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
    /// Per-device pseudo-identity, an audit aid only.
    pub device_token: String,
}

/// A registered ballot item, including its lifecycle and tally fields.
///
/// A `Pending` proposal carries empty tally fields; a `Voted` one carries the
/// full tally, a result and the round duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: RecordId,
    pub title: String,
    pub axis: String,
    pub scope: String,
    pub region: String,
    pub municipality: String,
    pub description: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub status: ProposalStatus,
    pub yes_votes: Option<u32>,
    pub no_votes: Option<u32>,
    pub abstain_votes: Option<u32>,
    pub total_votes: Option<u32>,
    pub voted_at: Option<Timestamp>,
    pub result: Option<ProposalResult>,
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub promoted: bool,
    pub classification_label: Option<String>,
    pub classification_color: Option<String>,
}

impl ProposalRecord {
    /// Clear every field a completed round populates, returning the proposal
    /// to its pre-vote shape.
    pub fn clear_tally(&mut self) {
        self.status = ProposalStatus::Pending;
        self.yes_votes = None;
        self.no_votes = None;
        self.abstain_votes = None;
        self.total_votes = None;
        self.voted_at = None;
        self.result = None;
        self.duration_secs = None;
    }
}

/// A voting-session control event. Append-only; the latest record wins, and
/// a reset-sentinel status forces the projected status back to not-started.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub id: RecordId,
    pub status: VotingStatus,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub recorded_at: Timestamp,
    /// Present only when the phase is being explicitly changed; the phase is
    /// sticky across records that omit it.
    pub phase: Option<Phase>,
}

/// Pointer to the proposal currently on screen, with its display text
/// denormalized so clients render without a second lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveProposalRecord {
    pub id: RecordId,
    pub proposal_id: RecordId,
    pub title: String,
    pub axis: String,
    pub body: String,
    pub recorded_at: Timestamp,
}

/// Configuration of the external voter-roster spreadsheet. Column fields are
/// single spreadsheet column letters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterConfigRecord {
    pub id: RecordId,
    pub sheet_url: String,
    pub sheet_name: String,
    pub name_column: String,
    pub secret_column: String,
    pub segment_column: Option<String>,
    pub representative_column: Option<String>,
    pub axis_column: Option<String>,
    pub recorded_at: Timestamp,
}

/// Configuration of the external proposal-import spreadsheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalImportConfigRecord {
    pub id: RecordId,
    pub sheet_url: String,
    pub sheet_name: String,
    pub title_column: String,
    pub axis_column: String,
    pub scope_column: String,
    pub region_column: String,
    pub municipality_column: String,
    pub description_column: String,
    pub recorded_at: Timestamp,
}

/// A manually provisioned voter account, checked before the external roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoterAccountRecord {
    pub id: RecordId,
    pub display_name: String,
    pub secret: String,
    pub segment: Option<String>,
    pub representative: Option<String>,
    pub axis: Option<String>,
    pub recorded_at: Timestamp,
}

/// A manually provisioned administrator account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminAccountRecord {
    pub id: RecordId,
    pub display_name: String,
    pub secret: String,
    /// Absent means every permission is granted at authentication time.
    pub permissions: Option<AdminPermissions>,
    pub recorded_at: Timestamp,
}

/// What a matching classification rule does to a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    None,
    PromoteToFinal,
}

/// A yes-percentage range mapped to a label/color, optionally promoting the
/// proposal to the final plenary round. Rules are evaluated in storage order;
/// the first match wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRuleRecord {
    pub id: RecordId,
    pub min_percent: f64,
    pub max_percent: f64,
    pub label: String,
    pub action: RuleAction,
    pub color: String,
    pub recorded_at: Timestamp,
}
