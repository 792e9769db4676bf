//! The Plenum service: store + projection + engines behind one handle.
//!
//! The service holds the only long-lived copy of the projected state. A
//! background task re-derives it whenever the store's change feed fires;
//! command methods also refresh inline after their own mutation so the next
//! read observes it (read-your-writes within the process). If a reload
//! fails, the previous state stays in place — stale state is recoverable,
//! a wiped one is not.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use plenum_projection::{project, ProjectedState};
use plenum_records::{
    AdminAccountRecord, ClassificationRuleRecord, ProposalImportConfigRecord, ProposalRecord,
    Record, RosterConfigRecord, VoteRecord, VoterAccountRecord,
};
use plenum_roster::{
    authenticate_admin, authenticate_voter, parse_proposals, AdminSession, ProposalDraft,
    SheetClient, VoterProfile,
};
use plenum_store::RecordStore;
use plenum_types::{
    AdminPermissions, Phase, ProposalStatus, RecordId, Timestamp, VoteChoice,
};
use plenum_voting::{self as voting, VoteTally, VoterIdentity, VotingError};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::sessions::AdminSessions;

// ── Command inputs ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterConfigInput {
    pub sheet_url: String,
    pub sheet_name: String,
    pub name_column: String,
    pub secret_column: String,
    pub segment_column: Option<String>,
    pub representative_column: Option<String>,
    pub axis_column: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfigInput {
    pub sheet_url: String,
    pub sheet_name: String,
    pub title_column: String,
    pub axis_column: String,
    pub scope_column: String,
    pub region_column: String,
    pub municipality_column: String,
    pub description_column: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoterAccountInput {
    pub display_name: String,
    pub secret: String,
    pub segment: Option<String>,
    pub representative: Option<String>,
    pub axis: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminAccountInput {
    pub display_name: String,
    pub secret: String,
    pub permissions: Option<AdminPermissions>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassificationRuleInput {
    pub min_percent: f64,
    pub max_percent: f64,
    pub label: String,
    pub action: plenum_records::RuleAction,
    pub color: String,
}

// ── Service ──────────────────────────────────────────────────────────────

pub struct PlenumService {
    store: Arc<dyn RecordStore>,
    state: RwLock<ProjectedState>,
    sessions: AdminSessions,
    sheets: SheetClient,
    master_secret: String,
}

impl PlenumService {
    /// Build the service and run the initial projection.
    pub fn new(store: Arc<dyn RecordStore>, master_secret: String) -> Result<Arc<Self>, ServerError> {
        let initial = project(&store.load_all()?);
        Ok(Arc::new(Self {
            store,
            state: RwLock::new(initial),
            sessions: AdminSessions::new(),
            sheets: SheetClient::new()?,
            master_secret,
        }))
    }

    /// React to store changes until the store is dropped.
    pub fn spawn_refresh_task(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut feed = service.store.subscribe();
            loop {
                match feed.recv().await {
                    // Whether we saw every event or lagged, the reaction is
                    // the same: re-read the whole log.
                    Ok(_) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                        service.refresh().await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Re-derive the projected state, keeping the previous one on failure.
    pub async fn refresh(&self) {
        match self.store.load_all() {
            Ok(records) => {
                *self.state.write().await = project(&records);
            }
            Err(e) => {
                error!("record reload failed, keeping previous projected state: {e}");
            }
        }
    }

    /// Snapshot of the current projected state.
    pub async fn state(&self) -> ProjectedState {
        self.state.read().await.clone()
    }

    // ── Authentication ───────────────────────────────────────────────────

    pub async fn authenticate_voter(&self, secret: &str) -> Result<VoterProfile, ServerError> {
        let state = self.state().await;
        let profile = authenticate_voter(
            &self.sheets,
            secret,
            &state.voter_accounts,
            state.roster_config.as_ref(),
        )
        .await?;
        Ok(profile)
    }

    /// Authenticate an admin and open a session.
    pub async fn admin_login(
        &self,
        username: Option<&str>,
        secret: &str,
    ) -> Result<(String, AdminPermissions), ServerError> {
        let state = self.state().await;
        let permissions =
            authenticate_admin(username, secret, &self.master_secret, &state.admin_accounts)?;
        let token = self
            .sessions
            .insert(AdminSession::new(permissions, Timestamp::now()));
        info!(username = username.unwrap_or("<master>"), "admin session opened");
        Ok((token, permissions))
    }

    pub fn admin_logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    /// Resolve a session token and require one permission bit.
    pub fn require_permission(
        &self,
        token: &str,
        pick: impl Fn(&AdminPermissions) -> bool,
        label: &'static str,
    ) -> Result<(), ServerError> {
        let permissions = self
            .sessions
            .permissions_for(token, Timestamp::now())
            .ok_or(ServerError::SessionExpired)?;
        if pick(&permissions) {
            Ok(())
        } else {
            Err(ServerError::PermissionDenied(label))
        }
    }

    // ── Voting ───────────────────────────────────────────────────────────

    pub async fn cast_vote(
        &self,
        voter: &VoterIdentity,
        choice: VoteChoice,
        device_token: &str,
    ) -> Result<VoteRecord, ServerError> {
        let state = self.state().await;
        let vote = voting::cast_vote(
            self.store.as_ref(),
            &state,
            voter,
            choice,
            device_token,
            Timestamp::now(),
        )?;
        self.refresh().await;
        Ok(vote)
    }

    pub async fn start_voting(&self) -> Result<(), ServerError> {
        let state = self.state().await;
        voting::start_voting(self.store.as_ref(), &state, Timestamp::now())?;
        self.refresh().await;
        Ok(())
    }

    pub async fn end_voting(&self) -> Result<Option<VoteTally>, ServerError> {
        let state = self.state().await;
        let tally = voting::end_voting(self.store.as_ref(), &state, Timestamp::now())?;
        self.refresh().await;
        Ok(tally)
    }

    pub async fn new_voting(&self) -> Result<(), ServerError> {
        let state = self.state().await;
        voting::new_voting(self.store.as_ref(), &state, Timestamp::now())?;
        self.refresh().await;
        Ok(())
    }

    pub async fn change_phase(&self, phase: Phase) -> Result<(), ServerError> {
        let state = self.state().await;
        voting::change_phase(self.store.as_ref(), &state, phase, Timestamp::now())?;
        self.refresh().await;
        Ok(())
    }

    /// Select a proposal for voting. Refuses proposals already voted — the
    /// engine exposes the check, the caller enforces it.
    pub async fn select_proposal(&self, proposal_id: &RecordId) -> Result<(), ServerError> {
        let state = self.state().await;
        let proposal = state
            .find_proposal(proposal_id)
            .ok_or_else(|| VotingError::ProposalNotFound(proposal_id.to_string()))?;
        if !voting::is_selectable(proposal) {
            return Err(VotingError::ProposalAlreadyVoted(proposal_id.to_string()).into());
        }
        voting::select_proposal(self.store.as_ref(), &state, proposal_id, Timestamp::now())?;
        self.refresh().await;
        Ok(())
    }

    pub async fn reset_proposal_votes(&self, proposal_id: &RecordId) -> Result<usize, ServerError> {
        let state = self.state().await;
        let deleted = voting::reset_proposal_votes(self.store.as_ref(), &state, proposal_id)?;
        self.refresh().await;
        Ok(deleted)
    }

    /// Run the classification rules over the full proposal set.
    pub async fn classify(&self) -> Result<voting::ClassificationOutcome, ServerError> {
        let state = self.state().await;
        let outcome = voting::apply_rules(
            self.store.as_ref(),
            &state.classification_rules,
            &state.proposals,
        )?;
        self.refresh().await;
        Ok(outcome)
    }

    // ── Proposal management ──────────────────────────────────────────────

    pub async fn create_proposal(&self, draft: ProposalDraft) -> Result<ProposalRecord, ServerError> {
        let proposal = proposal_from_draft(draft, Timestamp::now());
        self.store.append(Record::Proposal(proposal.clone()))?;
        self.refresh().await;
        Ok(proposal)
    }

    pub async fn update_proposal(&self, proposal: ProposalRecord) -> Result<(), ServerError> {
        self.store.update_by_id(Record::Proposal(proposal))?;
        self.refresh().await;
        Ok(())
    }

    pub async fn delete_proposal(&self, id: &RecordId) -> Result<(), ServerError> {
        self.store.delete_by_id(id)?;
        self.refresh().await;
        Ok(())
    }

    /// Import proposals from the configured spreadsheet; every row becomes a
    /// pending proposal. Returns how many were registered.
    pub async fn import_proposals(&self) -> Result<usize, ServerError> {
        let state = self.state().await;
        let config = state
            .import_config
            .as_ref()
            .ok_or(plenum_roster::RosterError::NotConfigured)?;
        let csv_text = self
            .sheets
            .fetch_csv(&config.sheet_url, &config.sheet_name)
            .await?;
        let drafts = parse_proposals(&csv_text, config)?;
        let count = drafts.len();
        for draft in drafts {
            self.store
                .append(Record::Proposal(proposal_from_draft(draft, Timestamp::now())))?;
        }
        self.refresh().await;
        info!(count, "imported proposals from spreadsheet");
        Ok(count)
    }

    // ── Accounts, configs, rules ─────────────────────────────────────────

    pub async fn save_roster_config(&self, input: RosterConfigInput) -> Result<(), ServerError> {
        self.store.append(Record::RosterConfig(RosterConfigRecord {
            id: RecordId::new(plenum_utils::fresh_id("roster")),
            sheet_url: input.sheet_url,
            sheet_name: input.sheet_name,
            name_column: input.name_column,
            secret_column: input.secret_column,
            segment_column: input.segment_column,
            representative_column: input.representative_column,
            axis_column: input.axis_column,
            recorded_at: Timestamp::now(),
        }))?;
        self.refresh().await;
        Ok(())
    }

    pub async fn save_import_config(&self, input: ImportConfigInput) -> Result<(), ServerError> {
        self.store
            .append(Record::ProposalImportConfig(ProposalImportConfigRecord {
                id: RecordId::new(plenum_utils::fresh_id("import")),
                sheet_url: input.sheet_url,
                sheet_name: input.sheet_name,
                title_column: input.title_column,
                axis_column: input.axis_column,
                scope_column: input.scope_column,
                region_column: input.region_column,
                municipality_column: input.municipality_column,
                description_column: input.description_column,
                recorded_at: Timestamp::now(),
            }))?;
        self.refresh().await;
        Ok(())
    }

    pub async fn create_voter_account(&self, input: VoterAccountInput) -> Result<(), ServerError> {
        self.store.append(Record::VoterAccount(VoterAccountRecord {
            id: RecordId::new(plenum_utils::fresh_id("voter")),
            display_name: input.display_name,
            secret: input.secret,
            segment: input.segment,
            representative: input.representative,
            axis: input.axis,
            recorded_at: Timestamp::now(),
        }))?;
        self.refresh().await;
        Ok(())
    }

    pub async fn create_admin_account(&self, input: AdminAccountInput) -> Result<(), ServerError> {
        self.store.append(Record::AdminAccount(AdminAccountRecord {
            id: RecordId::new(plenum_utils::fresh_id("admin")),
            display_name: input.display_name,
            secret: input.secret,
            permissions: input.permissions,
            recorded_at: Timestamp::now(),
        }))?;
        self.refresh().await;
        Ok(())
    }

    pub async fn save_classification_rule(
        &self,
        input: ClassificationRuleInput,
    ) -> Result<(), ServerError> {
        self.store
            .append(Record::ClassificationRule(ClassificationRuleRecord {
                id: RecordId::new(plenum_utils::fresh_id("rule")),
                min_percent: input.min_percent,
                max_percent: input.max_percent,
                label: input.label,
                action: input.action,
                color: input.color,
                recorded_at: Timestamp::now(),
            }))?;
        self.refresh().await;
        Ok(())
    }

    /// Voter accounts, admin accounts and classification rules all delete by
    /// bare record id.
    pub async fn delete_record(&self, id: &RecordId) -> Result<(), ServerError> {
        if let Err(e) = self.store.delete_by_id(id) {
            warn!(%id, "delete failed: {e}");
            return Err(e.into());
        }
        self.refresh().await;
        Ok(())
    }
}

fn proposal_from_draft(draft: ProposalDraft, now: Timestamp) -> ProposalRecord {
    ProposalRecord {
        id: RecordId::new(plenum_utils::fresh_id("proposal")),
        title: draft.title,
        axis: draft.axis,
        scope: draft.scope,
        region: draft.region,
        municipality: draft.municipality,
        description: draft.description,
        created_at: now,
        status: ProposalStatus::Pending,
        yes_votes: None,
        no_votes: None,
        abstain_votes: None,
        total_votes: None,
        voted_at: None,
        result: None,
        duration_secs: None,
        promoted: false,
        classification_label: None,
        classification_color: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_store::MemoryRecordStore;
    use plenum_types::{ProposalResult, VotingStatus};

    fn draft(title: &str, axis: &str) -> ProposalDraft {
        ProposalDraft {
            title: title.to_string(),
            axis: axis.to_string(),
            scope: "Municipal".into(),
            region: "North".into(),
            municipality: "Springfield".into(),
            description: "A proposal.".into(),
        }
    }

    fn service() -> Arc<PlenumService> {
        PlenumService::new(Arc::new(MemoryRecordStore::new()), "master".into()).unwrap()
    }

    #[tokio::test]
    async fn full_round_produces_an_approved_proposal() {
        let service = service();
        let proposal = service.create_proposal(draft("Clinics", "Axis I")).await.unwrap();
        service.select_proposal(&proposal.id).await.unwrap();
        service.start_voting().await.unwrap();

        for (name, choice) in [
            ("ana", VoteChoice::Yes),
            ("bia", VoteChoice::Yes),
            ("rui", VoteChoice::No),
        ] {
            let voter = VoterIdentity { id: name.into(), axis: Some("Axis I".into()) };
            service.cast_vote(&voter, choice, "d0").await.unwrap();
        }

        let tally = service.end_voting().await.unwrap().expect("tallied");
        assert_eq!(tally.total, 3);
        assert_eq!(tally.result, ProposalResult::Approved);

        let state = service.state().await;
        assert_eq!(state.control.status, VotingStatus::Closed);
        let p = state.find_proposal(&proposal.id).unwrap();
        assert_eq!(p.status, ProposalStatus::Voted);
        assert_eq!(p.yes_votes, Some(2));
    }

    #[tokio::test]
    async fn voted_proposals_cannot_be_reselected() {
        let service = service();
        let proposal = service.create_proposal(draft("Clinics", "Axis I")).await.unwrap();
        service.select_proposal(&proposal.id).await.unwrap();
        service.start_voting().await.unwrap();
        service.end_voting().await.unwrap();

        let err = service.select_proposal(&proposal.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Voting(VotingError::ProposalAlreadyVoted(_))
        ));
    }

    #[tokio::test]
    async fn new_voting_clears_display_but_keeps_history() {
        let service = service();
        let proposal = service.create_proposal(draft("Clinics", "Axis I")).await.unwrap();
        service.select_proposal(&proposal.id).await.unwrap();
        service.start_voting().await.unwrap();
        let voter = VoterIdentity { id: "ana".into(), axis: Some("Axis I".into()) };
        service.cast_vote(&voter, VoteChoice::Yes, "d0").await.unwrap();
        service.end_voting().await.unwrap();

        service.new_voting().await.unwrap();

        let state = service.state().await;
        assert_eq!(state.control.status, VotingStatus::NotStarted);
        assert!(state.active.is_none());
        assert_eq!(state.votes.len(), 1);
        assert_eq!(state.proposals.len(), 1);
    }

    #[tokio::test]
    async fn admin_sessions_gate_permissions() {
        let service = service();
        let (token, permissions) = service.admin_login(None, "master").await.unwrap();
        assert_eq!(permissions, AdminPermissions::all());
        assert!(service
            .require_permission(&token, |p| p.manage_voting, "manage_voting")
            .is_ok());

        service.admin_logout(&token);
        assert!(matches!(
            service.require_permission(&token, |p| p.manage_voting, "manage_voting"),
            Err(ServerError::SessionExpired)
        ));

        let err = service.admin_login(Some("ghost"), "wrong").await.unwrap_err();
        assert!(matches!(err, ServerError::Roster(_)));
    }

    #[tokio::test]
    async fn provisioned_admin_gets_stored_permission_set() {
        let service = service();
        let mut restricted = AdminPermissions::none();
        restricted.manage_proposals = true;
        service
            .create_admin_account(AdminAccountInput {
                display_name: "carla".into(),
                secret: "s-carla".into(),
                permissions: Some(restricted),
            })
            .await
            .unwrap();

        let (token, _) = service.admin_login(Some("carla"), "s-carla").await.unwrap();
        assert!(service
            .require_permission(&token, |p| p.manage_proposals, "manage_proposals")
            .is_ok());
        assert!(matches!(
            service.require_permission(&token, |p| p.manage_voting, "manage_voting"),
            Err(ServerError::PermissionDenied("manage_voting"))
        ));
    }

    #[tokio::test]
    async fn voter_accounts_authenticate_locally() {
        let service = service();
        service
            .create_voter_account(VoterAccountInput {
                display_name: "ana".into(),
                secret: "s-ana".into(),
                segment: None,
                representative: None,
                axis: Some("Axis I".into()),
            })
            .await
            .unwrap();

        let profile = service.authenticate_voter("s-ana").await.unwrap();
        assert_eq!(profile.display_name, "ana");
        assert_eq!(profile.axis.as_deref(), Some("Axis I"));
    }

    #[tokio::test]
    async fn refresh_task_tracks_external_appends() {
        let store = Arc::new(MemoryRecordStore::new());
        let service = PlenumService::new(
            Arc::clone(&store) as Arc<dyn RecordStore>,
            "master".into(),
        )
        .unwrap();
        let handle = service.spawn_refresh_task();

        // Mutate the store directly, as another session would.
        store
            .append(Record::Proposal(proposal_from_draft(
                draft("External", "Axis II"),
                Timestamp::new(1),
            )))
            .unwrap();

        // The refresh task is asynchronous; poll briefly.
        for _ in 0..50 {
            if service.state().await.proposals.len() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(service.state().await.proposals.len(), 1);
        handle.abort();
    }
}
