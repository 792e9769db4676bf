use plenum_store::StoreError;
use plenum_types::VotingStatus;
use thiserror::Error;

/// Rejection reasons are part of the user contract: every failure surfaces a
/// specific cause, never a generic error.
#[derive(Debug, Error)]
pub enum VotingError {
    #[error("voter is not authenticated")]
    NotAuthenticated,

    #[error("no proposal is currently selected for voting")]
    NoActiveProposal,

    #[error("voting is not open")]
    VotingClosed,

    #[error("voter {0} has already voted on this proposal")]
    AlreadyVoted(String),

    #[error("voter axis {voter_axis:?} does not match proposal axis {proposal_axis:?}")]
    NotEligible {
        voter_axis: Option<String>,
        proposal_axis: String,
    },

    #[error("cannot {action} while voting status is {status}")]
    InvalidTransition {
        action: &'static str,
        status: VotingStatus,
    },

    #[error("a voting round is in progress; end it before creating a new one")]
    VotingInProgress,

    #[error("proposal {0} not found")]
    ProposalNotFound(String),

    #[error("proposal {0} has already been voted")]
    ProposalAlreadyVoted(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
