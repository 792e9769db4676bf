use proptest::prelude::*;

use plenum_projection::project;
use plenum_records::{
    ActiveProposalRecord, ClassificationRuleRecord, ControlRecord, ProposalRecord, Record,
    RuleAction, VoteRecord,
};
use plenum_store::{MemoryRecordStore, RecordStore};
use plenum_types::{
    Phase, ProposalResult, ProposalStatus, RecordId, Timestamp, VoteChoice, VotingStatus,
};
use plenum_voting::{apply_rules, cast_vote, decide_result, end_voting, VoterIdentity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn proposal(id: &str, axis: &str) -> ProposalRecord {
    ProposalRecord {
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
    }
}

fn pointer(proposal_id: &str) -> Record {
    Record::ActiveProposal(ActiveProposalRecord {
        id: RecordId::from("active_1"),
        proposal_id: RecordId::from(proposal_id),
        title: "T".into(),
        axis: "Axis I".into(),
        body: "D".into(),
        recorded_at: Timestamp::new(100),
    })
}

fn started_control(phase: Phase, started_at: u64) -> Record {
    Record::Control(ControlRecord {
        id: RecordId::new(format!("control_{started_at}")),
        status: VotingStatus::Started,
        started_at: Some(Timestamp::new(started_at)),
        ended_at: None,
        recorded_at: Timestamp::new(started_at),
        phase: Some(phase),
    })
}

fn ballot(n: usize, choice: VoteChoice) -> Record {
    Record::Vote(VoteRecord {
        id: RecordId::new(format!("vote_{n}")),
        voter_id: format!("voter_{n}"),
        proposal_id: RecordId::from("proposal_1"),
        choice,
        cast_at: Timestamp::new(1_000 + n as u64),
        device_token: "d0".into(),
    })
}

fn seeded_store(phase: Phase, started_at: u64) -> MemoryRecordStore {
    MemoryRecordStore::with_records(vec![
        Record::Proposal(proposal("proposal_1", "Axis I")),
        pointer("proposal_1"),
        started_control(phase, started_at),
    ])
}

// ---------------------------------------------------------------------------
// Tally correctness
// ---------------------------------------------------------------------------

proptest! {
    /// Ending a round over (y, n, a) ballots yields total = y+n+a and a
    /// result that exactly mirrors the YES-vs-NO comparison.
    #[test]
    fn tally_matches_ballot_counts(y in 0u32..40, n in 0u32..40, a in 0u32..40) {
        let store = seeded_store(Phase::Plenary, 10_000);
        let mut i = 0usize;
        for _ in 0..y { store.append(ballot(i, VoteChoice::Yes)).unwrap(); i += 1; }
        for _ in 0..n { store.append(ballot(i, VoteChoice::No)).unwrap(); i += 1; }
        for _ in 0..a { store.append(ballot(i, VoteChoice::Abstain)).unwrap(); i += 1; }

        let state = project(&store.load_all().unwrap());
        let tally = end_voting(&store, &state, Timestamp::new(100_000))
            .unwrap()
            .expect("active proposal tallied");

        prop_assert_eq!(tally.total, y + n + a);
        prop_assert_eq!((tally.yes, tally.no, tally.abstain), (y, n, a));
        let expected = if y > n {
            ProposalResult::Approved
        } else if n > y {
            ProposalResult::Rejected
        } else {
            ProposalResult::Tie
        };
        prop_assert_eq!(tally.result, expected);
        prop_assert_eq!(tally.duration_secs, 90);
    }

    /// decide_result never yields AbstainMajority, whatever the counts.
    #[test]
    fn result_is_always_yes_no_comparison(y in 0u32..1000, n in 0u32..1000) {
        let result = decide_result(y, n);
        prop_assert_ne!(result, ProposalResult::AbstainMajority);
        prop_assert_eq!(result == ProposalResult::Approved, y > n);
        prop_assert_eq!(result == ProposalResult::Rejected, n > y);
        prop_assert_eq!(result == ProposalResult::Tie, y == n);
    }

    /// Idempotent voting: after one successful ballot, any further attempt by
    /// the same voter is rejected and the persisted count never changes.
    #[test]
    fn second_vote_never_lands(
        first in prop::sample::select(vec![VoteChoice::Yes, VoteChoice::No, VoteChoice::Abstain]),
        second in prop::sample::select(vec![VoteChoice::Yes, VoteChoice::No, VoteChoice::Abstain]),
    ) {
        let store = seeded_store(Phase::Plenary, 10_000);
        let ana = VoterIdentity { id: "ana".into(), axis: None };

        let state = project(&store.load_all().unwrap());
        cast_vote(&store, &state, &ana, first, "d0", Timestamp::new(20_000)).unwrap();
        let count_after_first = store.load_all().unwrap().len();

        let state = project(&store.load_all().unwrap());
        let retry = cast_vote(&store, &state, &ana, second, "d0", Timestamp::new(21_000));
        prop_assert!(retry.is_err());
        prop_assert_eq!(store.load_all().unwrap().len(), count_after_first);
    }

    /// Axis gating: during the axis phase a mismatched voter is always
    /// rejected; during the plenary phase the same voter always succeeds.
    #[test]
    fn axis_gate_flips_with_phase(case_shift in 0u8..4, pad in 0usize..3) {
        // Build a differently-cased, whitespace-padded rendition of the
        // matching axis, and a genuinely different axis.
        let matching = match case_shift {
            0 => "axis i".to_string(),
            1 => "AXIS I".to_string(),
            2 => "Axis I".to_string(),
            _ => "aXiS i".to_string(),
        };
        let padded = format!("{}{}{}", " ".repeat(pad), matching, " ".repeat(pad));
        let matched_voter = VoterIdentity { id: "ana".into(), axis: Some(padded) };
        let mismatched_voter = VoterIdentity { id: "bia".into(), axis: Some("Axis II".into()) };

        let axes_store = seeded_store(Phase::Axes, 10_000);
        let state = project(&axes_store.load_all().unwrap());
        prop_assert!(cast_vote(&axes_store, &state, &matched_voter, VoteChoice::Yes, "d0", Timestamp::new(20_000)).is_ok());
        prop_assert!(cast_vote(&axes_store, &state, &mismatched_voter, VoteChoice::Yes, "d1", Timestamp::new(20_001)).is_err());

        let plenary_store = seeded_store(Phase::Plenary, 10_000);
        let state = project(&plenary_store.load_all().unwrap());
        prop_assert!(cast_vote(&plenary_store, &state, &mismatched_voter, VoteChoice::Yes, "d1", Timestamp::new(20_002)).is_ok());
    }

    /// Classification is idempotent: the second application of an unchanged
    /// rule set over unchanged proposals performs zero writes.
    #[test]
    fn classification_second_pass_is_a_noop(y in 0u32..20, n in 0u32..20) {
        prop_assume!(y + n > 0);
        let store = MemoryRecordStore::new();
        let mut p = proposal("proposal_1", "Axis I");
        p.status = ProposalStatus::Voted;
        p.yes_votes = Some(y);
        p.no_votes = Some(n);
        p.abstain_votes = Some(0);
        p.total_votes = Some(y + n);
        p.result = Some(decide_result(y, n));
        store.append(Record::Proposal(p)).unwrap();

        let rules = [
            ClassificationRuleRecord {
                id: RecordId::from("rule_1"),
                min_percent: 50.0,
                max_percent: 100.0,
                label: "Qualified".into(),
                action: RuleAction::PromoteToFinal,
                color: "#16a085".into(),
                recorded_at: Timestamp::new(1),
            },
            ClassificationRuleRecord {
                id: RecordId::from("rule_2"),
                min_percent: 0.0,
                max_percent: 49.999,
                label: "Not qualified".into(),
                action: RuleAction::None,
                color: "#c0392b".into(),
                recorded_at: Timestamp::new(1),
            },
        ];

        let first = apply_rules(&store, &rules, &project(&store.load_all().unwrap()).proposals).unwrap();
        let second = apply_rules(&store, &rules, &project(&store.load_all().unwrap()).proposals).unwrap();
        prop_assert_eq!(second.matched, first.matched);
        prop_assert_eq!(second.updated, 0);
    }
}
