//! Service layer of the Plenum system.
//!
//! [`PlenumService`] owns the record store, keeps the current projected
//! state fresh by re-deriving it on every store change, and fronts the
//! voting/roster engines for the HTTP layer.

pub mod config;
pub mod error;
pub mod service;
pub mod sessions;

pub use config::ServerConfig;
pub use error::ServerError;
pub use service::{
    AdminAccountInput, ClassificationRuleInput, ImportConfigInput, PlenumService,
    RosterConfigInput, VoterAccountInput,
};
pub use sessions::AdminSessions;
