//! RPC error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plenum_roster::RosterError;
use plenum_server::ServerError;
use plenum_store::StoreError;
use plenum_voting::VotingError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for_voting(e: &VotingError) -> StatusCode {
    match e {
        VotingError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        VotingError::NotEligible { .. } => StatusCode::FORBIDDEN,
        VotingError::AlreadyVoted(_)
        | VotingError::VotingClosed
        | VotingError::NoActiveProposal
        | VotingError::InvalidTransition { .. }
        | VotingError::VotingInProgress
        | VotingError::ProposalAlreadyVoted(_) => StatusCode::CONFLICT,
        VotingError::ProposalNotFound(_) => StatusCode::NOT_FOUND,
        VotingError::Store(e) => status_for_store(e),
    }
}

fn status_for_store(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn status_for_roster(e: &RosterError) -> StatusCode {
    match e {
        RosterError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        RosterError::NotConfigured
        | RosterError::InvalidSheetUrl
        | RosterError::InvalidColumn(_) => StatusCode::CONFLICT,
        RosterError::HttpStatus(_) | RosterError::Http(_) => StatusCode::BAD_GATEWAY,
    }
}

impl RpcError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Server(ServerError::SessionExpired) => StatusCode::UNAUTHORIZED,
            Self::Server(ServerError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            Self::Server(ServerError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Server(ServerError::Voting(e)) => status_for_voting(e),
            Self::Server(ServerError::Store(e)) => status_for_store(e),
            Self::Server(ServerError::Roster(e)) => status_for_roster(e),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
