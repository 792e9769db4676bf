//! The external-data boundary of the Plenum system.
//!
//! Voter rosters and proposal imports live in published spreadsheets exposed
//! as CSV over HTTP. This crate parses that CSV, resolves the spreadsheet
//! URLs, authenticates voters (provisioned accounts first, roster second)
//! and admins (master secret or provisioned account), and manages the
//! short-lived admin sessions plus the per-device audit token.

pub mod auth;
pub mod csv;
pub mod error;
pub mod import;
pub mod session;
pub mod sheets;

pub use auth::{authenticate_admin, authenticate_voter, VoterProfile};
pub use error::RosterError;
pub use import::{parse_proposals, ProposalDraft};
pub use session::{AdminSession, DeviceToken, ADMIN_SESSION_TTL_MILLIS};
pub use sheets::SheetClient;
