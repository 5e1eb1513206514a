//! Conflict detection and whole-history evaluation.

use std::collections::{BTreeSet, HashMap};

use steward_types::TerminalOutcome;
use tracing::warn;

use crate::types::{
    ConflictReason, GovernanceConflict, GovernanceDecision, GovernanceEvaluation, GovernanceMode,
};

/// Find groups of decisions that claim to govern the same thing but
/// disagree on intent or justification.
///
/// Decisions are grouped by [`GovernanceDecision::grouping_key`]. Conflicts
/// are reported in order of each key's first appearance, with ids in
/// insertion order.
pub fn detect_conflicts(decisions: &[GovernanceDecision]) -> Vec<GovernanceConflict> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&GovernanceDecision>> = HashMap::new();
    for decision in decisions {
        let key = decision.grouping_key();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(decision);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let members = groups.get(key)?;
            if members.len() < 2 {
                return None;
            }
            let intents: BTreeSet<&str> = members.iter().map(|d| d.intent_id()).collect();
            let justifications: BTreeSet<&str> =
                members.iter().map(|d| d.justification()).collect();

            let mut reasons = Vec::new();
            if intents.len() > 1 {
                reasons.push(ConflictReason::IntentConflict);
            }
            if justifications.len() > 1 {
                reasons.push(ConflictReason::JustificationConflict);
            }
            if reasons.is_empty() {
                return None;
            }

            let conflict = GovernanceConflict {
                decision_key: key.to_string(),
                governance_ids: members
                    .iter()
                    .map(|d| d.governance_id().to_string())
                    .collect(),
                reasons,
            };
            warn!(
                decision_key = %conflict.decision_key,
                decisions = conflict.governance_ids.len(),
                reasons = ?conflict.reasons,
                "Conflicting governance decisions"
            );
            Some(conflict)
        })
        .collect()
}

/// Classify the full decision history as CLEAR or SAFE_HOLD.
pub fn evaluate_state(decisions: &[GovernanceDecision]) -> GovernanceEvaluation {
    let conflicts = detect_conflicts(decisions);
    let (mode, terminal_outcome) = if conflicts.is_empty() {
        (GovernanceMode::Clear, TerminalOutcome::Executed)
    } else {
        (GovernanceMode::SafeHold, TerminalOutcome::Halted)
    };
    GovernanceEvaluation {
        mode,
        requires_human_approval: mode == GovernanceMode::SafeHold,
        conflicts,
        terminal_outcome,
    }
}
