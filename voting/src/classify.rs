//! Classification rules: map a voted proposal's yes-percentage to a label,
//! a color, and optionally promotion to the final plenary round.
//!
//! Evaluation is a batch, admin-triggered pass over the full proposal set.
//! Rules are checked in their stored order and the first match wins — ranges
//! are usually authored disjoint, but nothing here assumes it. Repeated
//! application with unchanged inputs performs zero writes.

use plenum_records::{ClassificationRuleRecord, ProposalRecord, Record, RuleAction};
use plenum_store::RecordStore;
use plenum_types::ProposalStatus;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::VotingError;

/// What a classification pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// Voted proposals that matched some rule.
    pub matched: usize,
    /// Proposals actually rewritten (differs from `matched` when the stored
    /// classification was already current).
    pub updated: usize,
}

/// Yes-percentage of a voted proposal, when it has any ballots.
fn yes_percent(proposal: &ProposalRecord) -> Option<f64> {
    let total = proposal.total_votes.unwrap_or(0);
    if proposal.status != ProposalStatus::Voted || total == 0 {
        return None;
    }
    let yes = proposal.yes_votes.unwrap_or(0);
    Some(f64::from(yes) / f64::from(total) * 100.0)
}

/// First rule whose inclusive range contains the percentage.
fn first_match<'a>(
    rules: &'a [ClassificationRuleRecord],
    percent: f64,
) -> Option<&'a ClassificationRuleRecord> {
    rules
        .iter()
        .find(|rule| rule.min_percent <= percent && percent <= rule.max_percent)
}

/// Apply the rule set to every voted proposal.
///
/// Proposals that never went to a vote, or whose round recorded zero
/// ballots, are left untouched. A matching rule sets label and color and
/// recomputes the promotion flag — including clearing a stale promotion when
/// the matched rule does not promote.
pub fn apply_rules(
    store: &dyn RecordStore,
    rules: &[ClassificationRuleRecord],
    proposals: &[ProposalRecord],
) -> Result<ClassificationOutcome, VotingError> {
    let mut outcome = ClassificationOutcome::default();

    for proposal in proposals {
        let Some(percent) = yes_percent(proposal) else {
            continue;
        };
        let Some(rule) = first_match(rules, percent) else {
            continue;
        };
        outcome.matched += 1;

        let promoted = rule.action == RuleAction::PromoteToFinal;
        let unchanged = proposal.classification_label.as_deref() == Some(rule.label.as_str())
            && proposal.classification_color.as_deref() == Some(rule.color.as_str())
            && proposal.promoted == promoted;
        if unchanged {
            continue;
        }

        let mut classified = proposal.clone();
        classified.classification_label = Some(rule.label.clone());
        classified.classification_color = Some(rule.color.clone());
        classified.promoted = promoted;
        match store.update_by_id(Record::Proposal(classified)) {
            Ok(()) => outcome.updated += 1,
            Err(e) => warn!(proposal = %proposal.id, "could not persist classification: {e}"),
        }
    }
    Ok(outcome)
}
