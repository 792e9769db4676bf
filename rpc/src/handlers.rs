//! Request/response DTOs and handler functions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use plenum_projection::{ProjectedState, DEFAULT_AXIS_LABEL, DEFAULT_BODY_TEXT};
use plenum_records::ProposalRecord;
use plenum_roster::{DeviceToken, VoterProfile};
use plenum_server::{
    AdminAccountInput, ClassificationRuleInput, ImportConfigInput, PlenumService,
    RosterConfigInput, VoterAccountInput,
};
use plenum_types::{AdminPermissions, Phase, RecordId, Timestamp, VoteChoice, VotingStatus};
use plenum_voting::{ClassificationOutcome, VoteTally, VoterIdentity};

use crate::error::RpcError;

type Service = State<Arc<PlenumService>>;

fn bearer_token(headers: &HeaderMap) -> Result<&str, RpcError> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(RpcError::MissingToken)
}

// ── Public state ─────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct ActiveProposalView {
    pub proposal_id: String,
    pub title: String,
    pub axis: String,
    pub body: String,
}

#[derive(Serialize, Deserialize)]
pub struct BallotCounts {
    pub yes: u32,
    pub no: u32,
    pub abstain: u32,
    pub total: u32,
}

/// What an unauthenticated participant screen needs — no secrets, no
/// account material.
#[derive(Serialize, Deserialize)]
pub struct PublicStateResponse {
    pub status: VotingStatus,
    pub phase: Phase,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub active: Option<ActiveProposalView>,
    /// Denormalized display text, placeholders when nothing is selected.
    pub title: String,
    pub axis_label: String,
    pub body: String,
    /// Ballot counts for the active proposal's round.
    pub counts: BallotCounts,
}

fn public_view(state: &ProjectedState) -> PublicStateResponse {
    let active = state.active.as_ref().map(|a| ActiveProposalView {
        proposal_id: a.pointer.proposal_id.to_string(),
        title: a.pointer.title.clone(),
        axis: a.pointer.axis.clone(),
        body: a.pointer.body.clone(),
    });

    let counts = match &state.active {
        Some(a) => {
            let ballots = state.votes_for(&a.pointer.proposal_id);
            let count = |choice: VoteChoice| {
                ballots.iter().filter(|v| v.choice == choice).count() as u32
            };
            BallotCounts {
                yes: count(VoteChoice::Yes),
                no: count(VoteChoice::No),
                abstain: count(VoteChoice::Abstain),
                total: ballots.len() as u32,
            }
        }
        None => BallotCounts { yes: 0, no: 0, abstain: 0, total: 0 },
    };

    PublicStateResponse {
        status: state.control.status,
        phase: state.control.phase,
        started_at: state.control.started_at,
        ended_at: state.control.ended_at,
        title: active
            .as_ref()
            .map(|a| a.title.clone())
            .unwrap_or_else(|| "Proposal title".to_string()),
        axis_label: active
            .as_ref()
            .map(|a| a.axis.clone())
            .unwrap_or_else(|| DEFAULT_AXIS_LABEL.to_string()),
        body: active
            .as_ref()
            .map(|a| a.body.clone())
            .unwrap_or_else(|| DEFAULT_BODY_TEXT.to_string()),
        active,
        counts,
    }
}

pub async fn get_state(State(service): Service) -> Json<PublicStateResponse> {
    Json(public_view(&service.state().await))
}

/// Full projected state, for the admin panel.
pub async fn get_admin_state(
    State(service): Service,
    headers: HeaderMap,
) -> Result<Json<ProjectedState>, RpcError> {
    let token = bearer_token(&headers)?;
    service.require_permission(token, |p| p.manage_voting || p.manage_proposals || p.manage_users || p.manage_config, "any")?;
    Ok(Json(service.state().await))
}

// ── Authentication ───────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct VoterAuthRequest {
    pub secret: String,
}

pub async fn auth_voter(
    State(service): Service,
    Json(req): Json<VoterAuthRequest>,
) -> Result<Json<VoterProfile>, RpcError> {
    Ok(Json(service.authenticate_voter(&req.secret).await?))
}

#[derive(Deserialize, Serialize)]
pub struct AdminAuthRequest {
    pub username: Option<String>,
    pub secret: String,
}

#[derive(Serialize, Deserialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub permissions: AdminPermissions,
}

pub async fn auth_admin(
    State(service): Service,
    Json(req): Json<AdminAuthRequest>,
) -> Result<Json<AdminAuthResponse>, RpcError> {
    let (token, permissions) = service
        .admin_login(req.username.as_deref(), &req.secret)
        .await?;
    Ok(Json(AdminAuthResponse { token, permissions }))
}

pub async fn logout_admin(State(service): Service, headers: HeaderMap) -> Result<(), RpcError> {
    let token = bearer_token(&headers)?;
    service.admin_logout(token);
    Ok(())
}

// ── Voting ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct VoteRequest {
    pub voter_id: String,
    pub voter_axis: Option<String>,
    pub choice: VoteChoice,
    /// Returned by a previous vote from this device; omitted on first use.
    pub device_token: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct VoteResponse {
    pub vote_id: String,
    /// The token the device should persist and send with future ballots.
    pub device_token: String,
}

pub async fn cast_vote(
    State(service): Service,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, RpcError> {
    let device_token = req
        .device_token
        .map(DeviceToken::from)
        .unwrap_or_else(DeviceToken::generate);
    let voter = VoterIdentity {
        id: req.voter_id,
        axis: req.voter_axis,
    };
    let vote = service
        .cast_vote(&voter, req.choice, device_token.as_str())
        .await?;
    Ok(Json(VoteResponse {
        vote_id: vote.id.to_string(),
        device_token: device_token.as_str().to_string(),
    }))
}

// ── Voting lifecycle (admin) ─────────────────────────────────────────────

pub async fn start_voting(State(service): Service, headers: HeaderMap) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_voting, "manage_voting")?;
    service.start_voting().await?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
pub struct EndVotingResponse {
    pub tally: Option<VoteTally>,
}

pub async fn end_voting(
    State(service): Service,
    headers: HeaderMap,
) -> Result<Json<EndVotingResponse>, RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_voting, "manage_voting")?;
    let tally = service.end_voting().await?;
    Ok(Json(EndVotingResponse { tally }))
}

pub async fn new_voting(State(service): Service, headers: HeaderMap) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_voting, "manage_voting")?;
    service.new_voting().await?;
    Ok(())
}

#[derive(Deserialize, Serialize)]
pub struct ChangePhaseRequest {
    pub phase: Phase,
}

pub async fn change_phase(
    State(service): Service,
    headers: HeaderMap,
    Json(req): Json<ChangePhaseRequest>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_voting, "manage_voting")?;
    service.change_phase(req.phase).await?;
    Ok(())
}

// ── Proposal management (admin) ──────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct CreateProposalRequest {
    pub title: String,
    pub axis: String,
    pub scope: String,
    pub region: String,
    pub municipality: String,
    pub description: String,
}

pub async fn create_proposal(
    State(service): Service,
    headers: HeaderMap,
    Json(req): Json<CreateProposalRequest>,
) -> Result<Json<ProposalRecord>, RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    let proposal = service
        .create_proposal(plenum_roster::ProposalDraft {
            title: req.title,
            axis: req.axis,
            scope: req.scope,
            region: req.region,
            municipality: req.municipality,
            description: req.description,
        })
        .await?;
    Ok(Json(proposal))
}

pub async fn update_proposal(
    State(service): Service,
    headers: HeaderMap,
    Json(proposal): Json<ProposalRecord>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    service.update_proposal(proposal).await?;
    Ok(())
}

pub async fn delete_proposal(
    State(service): Service,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    service.delete_proposal(&RecordId::new(id)).await?;
    Ok(())
}

#[derive(Deserialize, Serialize)]
pub struct SelectProposalRequest {
    pub proposal_id: String,
}

pub async fn select_proposal(
    State(service): Service,
    headers: HeaderMap,
    Json(req): Json<SelectProposalRequest>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    service.select_proposal(&RecordId::new(req.proposal_id)).await?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
pub struct ResetVotesResponse {
    pub deleted: usize,
}

pub async fn reset_proposal_votes(
    State(service): Service,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ResetVotesResponse>, RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    let deleted = service.reset_proposal_votes(&RecordId::new(id)).await?;
    Ok(Json(ResetVotesResponse { deleted }))
}

pub async fn classify(
    State(service): Service,
    headers: HeaderMap,
) -> Result<Json<ClassificationOutcome>, RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    Ok(Json(service.classify().await?))
}

#[derive(Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
}

pub async fn import_proposals(
    State(service): Service,
    headers: HeaderMap,
) -> Result<Json<ImportResponse>, RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    let imported = service.import_proposals().await?;
    Ok(Json(ImportResponse { imported }))
}

// ── Accounts, configs, rules (admin) ─────────────────────────────────────

pub async fn save_roster_config(
    State(service): Service,
    headers: HeaderMap,
    Json(input): Json<RosterConfigInput>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_config, "manage_config")?;
    service.save_roster_config(input).await?;
    Ok(())
}

pub async fn save_import_config(
    State(service): Service,
    headers: HeaderMap,
    Json(input): Json<ImportConfigInput>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_config, "manage_config")?;
    service.save_import_config(input).await?;
    Ok(())
}

pub async fn create_voter_account(
    State(service): Service,
    headers: HeaderMap,
    Json(input): Json<VoterAccountInput>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_users, "manage_users")?;
    service.create_voter_account(input).await?;
    Ok(())
}

pub async fn create_admin_account(
    State(service): Service,
    headers: HeaderMap,
    Json(input): Json<AdminAccountInput>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_users, "manage_users")?;
    service.create_admin_account(input).await?;
    Ok(())
}

pub async fn save_classification_rule(
    State(service): Service,
    headers: HeaderMap,
    Json(input): Json<ClassificationRuleInput>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    service.save_classification_rule(input).await?;
    Ok(())
}

pub async fn delete_classification_rule(
    State(service): Service,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_proposals, "manage_proposals")?;
    service.delete_record(&RecordId::new(id)).await?;
    Ok(())
}

/// Deletes voter and admin accounts by id.
pub async fn delete_account(
    State(service): Service,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(), RpcError> {
    service.require_permission(bearer_token(&headers)?, |p| p.manage_users, "manage_users")?;
    service.delete_record(&RecordId::new(id)).await?;
    Ok(())
}
