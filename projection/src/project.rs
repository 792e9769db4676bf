//! The projection algorithm.

use plenum_records::{ControlRecord, Record};
use plenum_types::{Phase, Timestamp, VotingStatus};

use crate::state::{ActiveSelection, ControlState, ProjectedState};

/// Resolve a singleton category: stable sort by recorded time, newest first,
/// take the head. Ties keep storage order, so the earlier-stored record wins
/// — every singleton category must resolve through this one helper so the
/// tie-break never diverges.
fn latest_by<'a, T>(mut items: Vec<&'a T>, recorded_at: impl Fn(&T) -> Timestamp) -> Option<&'a T> {
    items.sort_by_key(|item| std::cmp::Reverse(recorded_at(item)));
    items.into_iter().next()
}

/// Derive the full application state from the trusted record sequence.
pub fn project(records: &[Record]) -> ProjectedState {
    let mut state = ProjectedState::default();

    let mut controls = Vec::new();
    let mut pointers = Vec::new();
    let mut roster_configs = Vec::new();
    let mut import_configs = Vec::new();

    for record in records {
        match record {
            Record::Vote(v) => state.votes.push(v.clone()),
            Record::Proposal(p) => state.proposals.push(p.clone()),
            Record::VoterAccount(a) => state.voter_accounts.push(a.clone()),
            Record::AdminAccount(a) => state.admin_accounts.push(a.clone()),
            Record::ClassificationRule(r) => state.classification_rules.push(r.clone()),
            Record::Control(c) => controls.push(c),
            Record::ActiveProposal(p) => pointers.push(p),
            Record::RosterConfig(c) => roster_configs.push(c),
            Record::ProposalImportConfig(c) => import_configs.push(c),
        }
    }

    state.control = fold_controls(&controls);

    // A "new voting" reset clears the on-screen selection without touching
    // history: pointers recorded at or before the latest reset sentinel are
    // simply no longer honored.
    let last_reset = controls
        .iter()
        .filter(|c| c.status.is_reset_sentinel())
        .map(|c| c.recorded_at)
        .max();
    let live_pointers: Vec<_> = pointers
        .into_iter()
        .filter(|p| last_reset.map_or(true, |reset_at| p.recorded_at > reset_at))
        .collect();
    state.active = latest_by(live_pointers, |p| p.recorded_at).map(|pointer| ActiveSelection {
        pointer: pointer.clone(),
        proposal: state
            .proposals
            .iter()
            .find(|p| p.id == pointer.proposal_id)
            .cloned(),
    });

    state.roster_config = latest_by(roster_configs, |c| c.recorded_at).cloned();
    state.import_config = latest_by(import_configs, |c| c.recorded_at).cloned();

    state
}

/// Resolve status and phase from the control log.
///
/// Status always derives from the latest record (a reset sentinel forcing
/// NotStarted with cleared times); phase is sticky — the most recent record
/// that carries one wins, regardless of what came after without one.
fn fold_controls(controls: &[&ControlRecord]) -> ControlState {
    let mut resolved = ControlState::default();

    let mut in_time_order: Vec<&&ControlRecord> = controls.iter().collect();
    in_time_order.sort_by_key(|c| c.recorded_at);
    for control in &in_time_order {
        if let Some(phase) = control.phase {
            resolved.phase = phase;
        }
    }

    if let Some(latest) = latest_by(controls.to_vec(), |c| c.recorded_at) {
        if latest.status.is_reset_sentinel() {
            resolved.status = VotingStatus::NotStarted;
            resolved.started_at = None;
            resolved.ended_at = None;
        } else {
            resolved.status = latest.status;
            resolved.started_at = latest.started_at;
            resolved.ended_at = latest.ended_at;
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_records::{ActiveProposalRecord, ProposalRecord, RosterConfigRecord};
    use plenum_types::{ProposalStatus, RecordId};

    fn control(id: &str, status: VotingStatus, at: u64) -> Record {
        Record::Control(ControlRecord {
            id: RecordId::from(id),
            status,
            started_at: (status == VotingStatus::Started).then(|| Timestamp::new(at)),
            ended_at: None,
            recorded_at: Timestamp::new(at),
            phase: None,
        })
    }

    fn control_with_phase(id: &str, status: VotingStatus, at: u64, phase: Phase) -> Record {
        Record::Control(ControlRecord {
            id: RecordId::from(id),
            status,
            started_at: None,
            ended_at: None,
            recorded_at: Timestamp::new(at),
            phase: Some(phase),
        })
    }

    fn pointer(id: &str, proposal_id: &str, at: u64) -> Record {
        Record::ActiveProposal(ActiveProposalRecord {
            id: RecordId::from(id),
            proposal_id: RecordId::from(proposal_id),
            title: "T".into(),
            axis: "Axis I".into(),
            body: "B".into(),
            recorded_at: Timestamp::new(at),
        })
    }

    fn proposal(id: &str) -> Record {
        Record::Proposal(ProposalRecord {
            id: RecordId::from(id),
            title: "T".into(),
            axis: "Axis I".into(),
            scope: "Municipal".into(),
            region: "R".into(),
            municipality: "M".into(),
            description: "D".into(),
            created_at: Timestamp::new(1),
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
        })
    }

    #[test]
    fn empty_log_projects_documented_defaults() {
        let state = project(&[]);
        assert_eq!(state.control.status, VotingStatus::NotStarted);
        assert_eq!(state.control.phase, Phase::Axes);
        assert_eq!(state.control.started_at, None);
        assert!(state.active.is_none());
        assert!(state.roster_config.is_none());
    }

    #[test]
    fn latest_control_wins_regardless_of_storage_order() {
        // T3 is stored first; projection must still pick it.
        let records = vec![
            control("control_3", VotingStatus::Closed, 3_000),
            control("control_1", VotingStatus::Started, 1_000),
            control("control_2", VotingStatus::Started, 2_000),
        ];
        let state = project(&records);
        assert_eq!(state.control.status, VotingStatus::Closed);
    }

    #[test]
    fn timestamp_ties_resolve_to_storage_order() {
        let records = vec![
            control("control_a", VotingStatus::Started, 1_000),
            control("control_b", VotingStatus::Closed, 1_000),
        ];
        // Stable sort keeps the first-stored record at the head.
        let state = project(&records);
        assert_eq!(state.control.status, VotingStatus::Started);
    }

    #[test]
    fn reset_sentinel_forces_not_started_and_clears_times() {
        let records = vec![
            control("control_1", VotingStatus::Started, 1_000),
            Record::Control(ControlRecord {
                id: RecordId::from("control_2"),
                status: VotingStatus::Reset,
                // A sentinel may carry stray times; they must be ignored.
                started_at: Some(Timestamp::new(999)),
                ended_at: Some(Timestamp::new(1_500)),
                recorded_at: Timestamp::new(2_000),
                phase: None,
            }),
        ];
        let state = project(&records);
        assert_eq!(state.control.status, VotingStatus::NotStarted);
        assert_eq!(state.control.started_at, None);
        assert_eq!(state.control.ended_at, None);
    }

    #[test]
    fn phase_is_sticky_across_records_without_one() {
        let records = vec![
            control_with_phase("control_1", VotingStatus::NotStarted, 1_000, Phase::Plenary),
            control("control_2", VotingStatus::Started, 2_000),
            control("control_3", VotingStatus::Closed, 3_000),
        ];
        let state = project(&records);
        assert_eq!(state.control.phase, Phase::Plenary);
        assert_eq!(state.control.status, VotingStatus::Closed);
    }

    #[test]
    fn phase_survives_a_reset_sentinel() {
        let records = vec![
            control_with_phase("control_1", VotingStatus::NotStarted, 1_000, Phase::Plenary),
            control("control_2", VotingStatus::Reset, 2_000),
        ];
        let state = project(&records);
        assert_eq!(state.control.phase, Phase::Plenary);
        assert_eq!(state.control.status, VotingStatus::NotStarted);
    }

    #[test]
    fn active_selection_joins_registered_proposal() {
        let records = vec![
            proposal("proposal_1"),
            pointer("active_1", "proposal_1", 1_000),
        ];
        let state = project(&records);
        let active = state.active.expect("selection resolved");
        assert_eq!(active.pointer.proposal_id.as_str(), "proposal_1");
        assert_eq!(active.proposal.as_ref().map(|p| p.id.as_str()), Some("proposal_1"));
    }

    #[test]
    fn active_selection_with_missing_proposal_keeps_pointer_text() {
        let records = vec![pointer("active_1", "proposal_gone", 1_000)];
        let state = project(&records);
        let active = state.active.expect("selection resolved");
        assert!(active.proposal.is_none());
        assert_eq!(active.pointer.title, "T");
    }

    #[test]
    fn reset_clears_pointer_but_preserves_history() {
        let records = vec![
            proposal("proposal_1"),
            pointer("active_1", "proposal_1", 1_000),
            control("control_1", VotingStatus::Reset, 2_000),
            control("control_2", VotingStatus::NewVotingCreated, 2_001),
        ];
        let state = project(&records);
        assert_eq!(state.control.status, VotingStatus::NotStarted);
        assert!(state.active.is_none());
        // History untouched: the proposal is still projected.
        assert_eq!(state.proposals.len(), 1);

        // A pointer appended after the reset is honored again.
        let mut with_new_pointer = records;
        with_new_pointer.push(pointer("active_2", "proposal_1", 3_000));
        let state = project(&with_new_pointer);
        assert!(state.active.is_some());
    }

    #[test]
    fn latest_roster_config_wins() {
        let config = |id: &str, at: u64, sheet: &str| {
            Record::RosterConfig(RosterConfigRecord {
                id: RecordId::from(id),
                sheet_url: sheet.to_string(),
                sheet_name: "Voters".into(),
                name_column: "A".into(),
                secret_column: "B".into(),
                segment_column: None,
                representative_column: None,
                axis_column: None,
                recorded_at: Timestamp::new(at),
            })
        };
        let records = vec![
            config("roster_2", 2_000, "https://example.com/new"),
            config("roster_1", 1_000, "https://example.com/old"),
        ];
        let state = project(&records);
        assert_eq!(
            state.roster_config.map(|c| c.sheet_url),
            Some("https://example.com/new".to_string())
        );
    }
}
