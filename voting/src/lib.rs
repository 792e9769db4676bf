//! Voting engines for the Plenum system.
//!
//! Three concerns share this crate because they share one invariant set:
//! - **Eligibility** (`eligibility`): who may cast a ballot right now —
//!   at most one vote per (voter, proposal), gated by phase and axis.
//! - **Lifecycle** (`lifecycle`): start/end/reset transitions of a voting
//!   round, including the final tally and duration.
//! - **Classification** (`classify`): percentage-range rules mapping voted
//!   proposals to labels and final-round promotion.
//!
//! Every engine is a set of pure-ish functions over the projected state plus
//! a [`plenum_store::RecordStore`] for the resulting appends/updates; none of
//! them keeps state of its own.

pub mod classify;
pub mod eligibility;
pub mod error;
pub mod lifecycle;

pub use classify::{apply_rules, ClassificationOutcome};
pub use eligibility::{cast_vote, check_eligibility, VoterIdentity};
pub use error::VotingError;
pub use lifecycle::{
    change_phase, decide_result, end_voting, is_selectable, new_voting, reset_proposal_votes,
    select_proposal, start_voting, VoteTally,
};
