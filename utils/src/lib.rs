//! Shared utilities for the Plenum voting system.

pub mod ids;
pub mod logging;

pub use ids::{fresh_id, fresh_token};
pub use logging::init_tracing;
