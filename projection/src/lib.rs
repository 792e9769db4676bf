//! State projection over the record log.
//!
//! Nothing in the system holds state of its own: every view — voting status,
//! phase, active proposal, tallies, accounts, configs — is re-derived from
//! the full trusted record sequence on each change. This crate is that
//! derivation. It is pure and total: projecting any record sequence yields a
//! well-defined state, so a caller can always keep its previous state when a
//! reload fails and retry later.

pub mod project;
pub mod state;

pub use project::project;
pub use state::{
    ActiveSelection, ControlState, ProjectedState, DEFAULT_AXIS_LABEL, DEFAULT_BODY_TEXT,
};
