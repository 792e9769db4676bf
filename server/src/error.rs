use plenum_roster::RosterError;
use plenum_store::StoreError;
use plenum_voting::VotingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Voting(#[from] VotingError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("admin session is missing or expired")]
    SessionExpired,

    #[error("admin session lacks the '{0}' permission")]
    PermissionDenied(&'static str),
}
