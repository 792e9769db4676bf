//! Fundamental types for the Plenum voting system.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: record ids, timestamps, vote choices, voting/proposal state
//! enums, the system phase, and admin permission sets.

pub mod choice;
pub mod id;
pub mod permissions;
pub mod phase;
pub mod proposal;
pub mod status;
pub mod time;

pub use choice::VoteChoice;
pub use id::RecordId;
pub use permissions::AdminPermissions;
pub use phase::Phase;
pub use proposal::{ProposalResult, ProposalStatus};
pub use status::VotingStatus;
pub use time::Timestamp;
