//! Voting-round lifecycle: start, end, reset, selection, phase changes.
//!
//! The session state machine is `NotStarted → Started → Closed`, with the
//! reset sentinels routing any non-started state back to `NotStarted`.
//! Transitions never mutate control records — they append — so the machine's
//! current state is always whatever the projector derives from the log.

use plenum_projection::ProjectedState;
use plenum_records::{ActiveProposalRecord, ControlRecord, Record};
use plenum_store::RecordStore;
use plenum_types::{
    Phase, ProposalResult, ProposalStatus, RecordId, Timestamp, VotingStatus,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::VotingError;

/// Final tally of one voting round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: u32,
    pub no: u32,
    pub abstain: u32,
    pub total: u32,
    pub result: ProposalResult,
    pub duration_secs: u64,
}

/// Strict-majority result: only YES and NO are compared; equality is a tie.
/// (Abstention-majority exists in the data model but is never computed here.)
pub fn decide_result(yes: u32, no: u32) -> ProposalResult {
    match yes.cmp(&no) {
        std::cmp::Ordering::Greater => ProposalResult::Approved,
        std::cmp::Ordering::Less => ProposalResult::Rejected,
        std::cmp::Ordering::Equal => ProposalResult::Tie,
    }
}

/// Whether a proposal can be put on screen for a new round.
pub fn is_selectable(proposal: &plenum_records::ProposalRecord) -> bool {
    proposal.status != ProposalStatus::Voted
}

fn fresh_control_id() -> RecordId {
    RecordId::new(plenum_utils::fresh_id("control"))
}

/// Open a voting round. Allowed only from `NotStarted`.
///
/// Appends the `Started` control record carrying the current phase, then
/// moves the active proposal (if one is selected) to `InVoting`.
pub fn start_voting(
    store: &dyn RecordStore,
    state: &ProjectedState,
    now: Timestamp,
) -> Result<(), VotingError> {
    if state.control.status != VotingStatus::NotStarted {
        return Err(VotingError::InvalidTransition {
            action: "start voting",
            status: state.control.status,
        });
    }

    store.append(Record::Control(ControlRecord {
        id: fresh_control_id(),
        status: VotingStatus::Started,
        started_at: Some(now),
        ended_at: None,
        recorded_at: now,
        phase: Some(state.control.phase),
    }))?;

    if let Some(proposal) = state.active_proposal() {
        let mut in_voting = proposal.clone();
        in_voting.status = ProposalStatus::InVoting;
        if let Err(e) = store.update_by_id(Record::Proposal(in_voting)) {
            // The round is already open; a missing proposal record only
            // costs the status badge.
            warn!(proposal = %proposal.id, "could not mark proposal as in-voting: {e}");
        }
    }
    Ok(())
}

/// Close the current round. Allowed only from `Started`.
///
/// Tallies the active proposal's ballots, writes tally/result/duration onto
/// the proposal record, then appends the `Closed` control record. When no
/// proposal is selected there is nothing to tally and only the control
/// record is appended.
pub fn end_voting(
    store: &dyn RecordStore,
    state: &ProjectedState,
    now: Timestamp,
) -> Result<Option<VoteTally>, VotingError> {
    if state.control.status != VotingStatus::Started {
        return Err(VotingError::InvalidTransition {
            action: "end voting",
            status: state.control.status,
        });
    }

    let tally = match state.active_proposal() {
        Some(proposal) => {
            let ballots = state.votes_for(&proposal.id);
            let yes = ballots.iter().filter(|v| v.choice == plenum_types::VoteChoice::Yes).count() as u32;
            let no = ballots.iter().filter(|v| v.choice == plenum_types::VoteChoice::No).count() as u32;
            let abstain =
                ballots.iter().filter(|v| v.choice == plenum_types::VoteChoice::Abstain).count() as u32;
            let tally = VoteTally {
                yes,
                no,
                abstain,
                total: ballots.len() as u32,
                result: decide_result(yes, no),
                duration_secs: state
                    .control
                    .started_at
                    .map(|started| started.elapsed_secs_rounded(now))
                    .unwrap_or(0),
            };

            let mut voted = proposal.clone();
            voted.status = ProposalStatus::Voted;
            voted.yes_votes = Some(tally.yes);
            voted.no_votes = Some(tally.no);
            voted.abstain_votes = Some(tally.abstain);
            voted.total_votes = Some(tally.total);
            voted.voted_at = Some(now);
            voted.result = Some(tally.result);
            voted.duration_secs = Some(tally.duration_secs);
            if let Err(e) = store.update_by_id(Record::Proposal(voted)) {
                warn!(proposal = %proposal.id, "could not persist tally: {e}");
            }
            Some(tally)
        }
        None => {
            warn!("ending a round with no proposal selected; nothing to tally");
            None
        }
    };

    store.append(Record::Control(ControlRecord {
        id: fresh_control_id(),
        status: VotingStatus::Closed,
        started_at: state.control.started_at,
        ended_at: Some(now),
        recorded_at: now,
        phase: None,
    }))?;
    Ok(tally)
}

/// Prepare a new round: append the `Reset` + `NewVotingCreated` sentinels.
///
/// Refused while a round is open — an active tally must be ended, not
/// silently discarded. Existing vote and proposal history is preserved;
/// only the projected display state (status, times, active pointer) resets.
pub fn new_voting(
    store: &dyn RecordStore,
    state: &ProjectedState,
    now: Timestamp,
) -> Result<(), VotingError> {
    if state.control.status == VotingStatus::Started {
        return Err(VotingError::VotingInProgress);
    }

    store.append(Record::Control(ControlRecord {
        id: fresh_control_id(),
        status: VotingStatus::Reset,
        started_at: None,
        ended_at: None,
        recorded_at: now,
        phase: None,
    }))?;
    store.append(Record::Control(ControlRecord {
        id: fresh_control_id(),
        status: VotingStatus::NewVotingCreated,
        started_at: None,
        ended_at: None,
        recorded_at: now,
        phase: None,
    }))?;
    Ok(())
}

/// Delete one proposal's ballots and return it to `Pending`.
///
/// This is the only operation that removes vote records. Returns the number
/// of ballots deleted.
pub fn reset_proposal_votes(
    store: &dyn RecordStore,
    state: &ProjectedState,
    proposal_id: &RecordId,
) -> Result<usize, VotingError> {
    let Some(proposal) = state.find_proposal(proposal_id) else {
        return Err(VotingError::ProposalNotFound(proposal_id.to_string()));
    };

    let ballot_ids: Vec<RecordId> = state
        .votes_for(proposal_id)
        .iter()
        .map(|v| v.id.clone())
        .collect();
    store.delete_many(&ballot_ids)?;

    let mut cleared = proposal.clone();
    cleared.clear_tally();
    store.update_by_id(Record::Proposal(cleared))?;
    Ok(ballot_ids.len())
}

/// Put a proposal on screen by appending an active-proposal pointer.
///
/// The engine does not forbid selecting a voted proposal — callers are
/// expected to consult [`is_selectable`] first and refuse.
pub fn select_proposal(
    store: &dyn RecordStore,
    state: &ProjectedState,
    proposal_id: &RecordId,
    now: Timestamp,
) -> Result<(), VotingError> {
    let Some(proposal) = state.find_proposal(proposal_id) else {
        return Err(VotingError::ProposalNotFound(proposal_id.to_string()));
    };

    store.append(Record::ActiveProposal(ActiveProposalRecord {
        id: RecordId::new(plenum_utils::fresh_id("active")),
        proposal_id: proposal.id.clone(),
        title: proposal.title.clone(),
        axis: proposal.axis.clone(),
        body: proposal.description.clone(),
        recorded_at: now,
    }))?;
    Ok(())
}

/// Switch the global phase without disturbing the status derivation: the
/// appended record re-carries the currently projected status and times.
pub fn change_phase(
    store: &dyn RecordStore,
    state: &ProjectedState,
    phase: Phase,
    now: Timestamp,
) -> Result<(), VotingError> {
    store.append(Record::Control(ControlRecord {
        id: fresh_control_id(),
        status: state.control.status,
        started_at: state.control.started_at,
        ended_at: state.control.ended_at,
        recorded_at: now,
        phase: Some(phase),
    }))?;
    Ok(())
}
