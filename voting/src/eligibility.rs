//! Vote eligibility and ballot construction.
//!
//! The checks run in a fixed order so the caller always gets the most
//! specific rejection: authentication, active proposal, open round,
//! one-vote-per-proposal, then the phase/axis gate. Missing axis data never
//! grants access — during the axis phase a voter with no axis (or a proposal
//! with a blank one) is ineligible.

use plenum_projection::ProjectedState;
use plenum_records::{ProposalRecord, Record, VoteRecord};
use plenum_store::RecordStore;
use plenum_types::{Phase, RecordId, Timestamp, VoteChoice};
use serde::{Deserialize, Serialize};

use crate::error::VotingError;

/// Identity of an authenticated voter, as established by the roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterIdentity {
    /// Display name / roster code. Also the vote's `voter_id`.
    pub id: String,
    /// Thematic axis, when the roster assigns one.
    pub axis: Option<String>,
}

/// Case-insensitive, whitespace-trimmed axis comparison.
fn axis_matches(voter_axis: &str, proposal_axis: &str) -> bool {
    let voter = voter_axis.trim();
    let proposal = proposal_axis.trim();
    !voter.is_empty() && !proposal.is_empty() && voter.to_lowercase() == proposal.to_lowercase()
}

/// Decide whether `voter` may cast a ballot right now, returning the active
/// proposal the ballot would apply to.
pub fn check_eligibility<'a>(
    voter: &VoterIdentity,
    state: &'a ProjectedState,
) -> Result<&'a ProposalRecord, VotingError> {
    if voter.id.trim().is_empty() {
        return Err(VotingError::NotAuthenticated);
    }
    let Some(proposal) = state.active_proposal() else {
        return Err(VotingError::NoActiveProposal);
    };
    if !state.control.status.is_open() {
        return Err(VotingError::VotingClosed);
    }
    if state.has_voted(&voter.id, &proposal.id) {
        return Err(VotingError::AlreadyVoted(voter.id.clone()));
    }

    match state.control.phase {
        // The final plenary round is open to every authenticated voter.
        Phase::Plenary => Ok(proposal),
        Phase::Axes => {
            let eligible = voter
                .axis
                .as_deref()
                .map(|axis| axis_matches(axis, &proposal.axis))
                .unwrap_or(false);
            if eligible {
                Ok(proposal)
            } else {
                Err(VotingError::NotEligible {
                    voter_axis: voter.axis.clone(),
                    proposal_axis: proposal.axis.clone(),
                })
            }
        }
    }
}

/// Cast a ballot: run the eligibility checks and append the vote record.
///
/// On success the persisted record is returned; on failure nothing is
/// written and the error names the exact rejection reason.
pub fn cast_vote(
    store: &dyn RecordStore,
    state: &ProjectedState,
    voter: &VoterIdentity,
    choice: VoteChoice,
    device_token: &str,
    now: Timestamp,
) -> Result<VoteRecord, VotingError> {
    let proposal = check_eligibility(voter, state)?;
    let vote = VoteRecord {
        id: RecordId::new(plenum_utils::fresh_id("vote")),
        voter_id: voter.id.clone(),
        proposal_id: proposal.id.clone(),
        choice,
        cast_at: now,
        device_token: device_token.to_string(),
    };
    store.append(Record::Vote(vote.clone()))?;
    Ok(vote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_projection::project;
    use plenum_records::{ActiveProposalRecord, ControlRecord};
    use plenum_store::MemoryRecordStore;
    use plenum_types::{ProposalStatus, VotingStatus};

    fn proposal(id: &str, axis: &str) -> Record {
        Record::Proposal(ProposalRecord {
            id: RecordId::from(id),
            title: "T".into(),
            axis: axis.to_string(),
            scope: "Municipal".into(),
            region: "R".into(),
            municipality: "M".into(),
            description: "D".into(),
            created_at: Timestamp::new(1),
            status: ProposalStatus::InVoting,
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
        })
    }

    fn pointer(proposal_id: &str, at: u64) -> Record {
        Record::ActiveProposal(ActiveProposalRecord {
            id: RecordId::from("active_1"),
            proposal_id: RecordId::from(proposal_id),
            title: "T".into(),
            axis: "Axis I".into(),
            body: "D".into(),
            recorded_at: Timestamp::new(at),
        })
    }

    fn control(status: VotingStatus, phase: Option<Phase>, at: u64) -> Record {
        Record::Control(ControlRecord {
            id: RecordId::new(format!("control_{at}")),
            status,
            started_at: None,
            ended_at: None,
            recorded_at: Timestamp::new(at),
            phase,
        })
    }

    fn voter(id: &str, axis: Option<&str>) -> VoterIdentity {
        VoterIdentity {
            id: id.to_string(),
            axis: axis.map(str::to_string),
        }
    }

    fn open_state(proposal_axis: &str, phase: Phase) -> ProjectedState {
        project(&[
            proposal("proposal_1", proposal_axis),
            pointer("proposal_1", 100),
            control(VotingStatus::Started, Some(phase), 200),
        ])
    }

    #[test]
    fn rejects_before_any_selection() {
        let state = project(&[control(VotingStatus::Started, None, 100)]);
        let err = check_eligibility(&voter("ana", None), &state).unwrap_err();
        assert!(matches!(err, VotingError::NoActiveProposal));
    }

    #[test]
    fn rejects_when_round_not_open() {
        let state = project(&[
            proposal("proposal_1", "Axis I"),
            pointer("proposal_1", 100),
        ]);
        let err = check_eligibility(&voter("ana", Some("Axis I")), &state).unwrap_err();
        assert!(matches!(err, VotingError::VotingClosed));
    }

    #[test]
    fn rejects_blank_voter_id() {
        let state = open_state("Axis I", Phase::Plenary);
        let err = check_eligibility(&voter("  ", None), &state).unwrap_err();
        assert!(matches!(err, VotingError::NotAuthenticated));
    }

    #[test]
    fn axis_phase_gates_on_matching_axis() {
        let state = open_state("Axis I", Phase::Axes);
        assert!(check_eligibility(&voter("ana", Some("Axis I")), &state).is_ok());
        // Case and whitespace variations still match.
        assert!(check_eligibility(&voter("bia", Some("  axis i ")), &state).is_ok());

        let err = check_eligibility(&voter("rui", Some("Axis II")), &state).unwrap_err();
        assert!(matches!(err, VotingError::NotEligible { .. }));
    }

    #[test]
    fn missing_axis_fails_closed_in_axis_phase() {
        let state = open_state("Axis I", Phase::Axes);
        assert!(check_eligibility(&voter("ana", None), &state).is_err());
        assert!(check_eligibility(&voter("bia", Some("")), &state).is_err());

        // And a proposal with a blank axis admits nobody.
        let blank = open_state("   ", Phase::Axes);
        assert!(check_eligibility(&voter("ana", Some("Axis I")), &blank).is_err());
    }

    #[test]
    fn plenary_phase_admits_any_axis() {
        let state = open_state("Axis I", Phase::Plenary);
        assert!(check_eligibility(&voter("ana", Some("Axis II")), &state).is_ok());
        assert!(check_eligibility(&voter("bia", None), &state).is_ok());
    }

    #[test]
    fn second_vote_is_rejected_and_count_unchanged() {
        let store = MemoryRecordStore::new();
        let state = open_state("Axis I", Phase::Plenary);

        let ana = voter("ana", None);
        cast_vote(&store, &state, &ana, VoteChoice::Yes, "d0", Timestamp::new(300)).unwrap();

        // Re-project so the first ballot is visible, then try again.
        let state = project(&{
            let mut records: Vec<Record> = Vec::new();
            records.push(proposal("proposal_1", "Axis I"));
            records.push(pointer("proposal_1", 100));
            records.push(control(VotingStatus::Started, Some(Phase::Plenary), 200));
            records.extend(store.load_all().unwrap());
            records
        });
        let err =
            cast_vote(&store, &state, &ana, VoteChoice::No, "d0", Timestamp::new(400)).unwrap_err();
        assert!(matches!(err, VotingError::AlreadyVoted(_)));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn successful_vote_appends_a_well_formed_record() {
        let store = MemoryRecordStore::new();
        let state = open_state("Axis I", Phase::Plenary);

        let vote = cast_vote(
            &store,
            &state,
            &voter("ana", None),
            VoteChoice::Abstain,
            "device_7",
            Timestamp::new(300),
        )
        .unwrap();
        assert!(vote.id.as_str().starts_with("vote_"));
        assert_eq!(vote.proposal_id.as_str(), "proposal_1");
        assert_eq!(vote.device_token, "device_7");
        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
