//! The event-log record model.
//!
//! Every piece of application state lives in one ordered log of tagged
//! records. This crate defines the closed sum type for those records and the
//! validation gate between stored bytes and trusted records: raw entries that
//! fail validation are excluded from decoding (and from every downstream
//! projection) but are deliberately never deleted from storage.

pub mod record;
pub mod validate;

pub use record::{
    ActiveProposalRecord, AdminAccountRecord, ClassificationRuleRecord, ControlRecord,
    ProposalImportConfigRecord, ProposalRecord, Record, RecordKind, RosterConfigRecord, RuleAction,
    VoteRecord, VoterAccountRecord,
};
pub use validate::{decode_log, decode_value, is_valid};
