use proptest::prelude::*;

use plenum_types::{Phase, ProposalResult, Timestamp, VoteChoice, VotingStatus};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// elapsed_millis(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_millis(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_millis(now), offset);
    }

    /// elapsed_millis saturates to 0 when now < self.
    #[test]
    fn timestamp_elapsed_saturates(base in 1u64..1_000_000, deficit in 1u64..1_000_000) {
        let later = Timestamp::new(base + deficit);
        let earlier = Timestamp::new(base);
        prop_assert_eq!(later.elapsed_millis(earlier), 0);
    }

    /// Rounded whole seconds never drift more than half a second from the
    /// exact millisecond delta.
    #[test]
    fn timestamp_rounding_bound(base in 0u64..1_000_000, offset in 0u64..10_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        let secs = t.elapsed_secs_rounded(now);
        let exact = offset as f64 / 1000.0;
        prop_assert!((secs as f64 - exact).abs() <= 0.5);
    }

    /// has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start.saturating_add(offset));
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }
}

#[test]
fn enum_json_tags_are_stable() {
    // The record log is shared with browser clients; these tag strings are
    // part of the persisted contract and must not drift.
    assert_eq!(serde_json::to_string(&VoteChoice::Abstain).unwrap(), "\"abstain\"");
    assert_eq!(
        serde_json::to_string(&VotingStatus::NewVotingCreated).unwrap(),
        "\"new_voting_created\""
    );
    assert_eq!(serde_json::to_string(&Phase::Plenary).unwrap(), "\"plenary\"");
    assert_eq!(
        serde_json::to_string(&ProposalResult::AbstainMajority).unwrap(),
        "\"abstain_majority\""
    );
}

#[test]
fn reset_sentinels_are_exactly_reset_and_new_voting() {
    for status in [
        VotingStatus::NotStarted,
        VotingStatus::Started,
        VotingStatus::Closed,
        VotingStatus::Reset,
        VotingStatus::NewVotingCreated,
    ] {
        let expected = matches!(status, VotingStatus::Reset | VotingStatus::NewVotingCreated);
        assert_eq!(status.is_reset_sentinel(), expected);
    }
}
