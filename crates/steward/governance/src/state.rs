//! Governance ledger state: an immutable value threaded through calls.

use serde::{Deserialize, Serialize};
use steward_types::{chronological, LogicalClock, LogicalTime};

use crate::error::GovernanceResult;
use crate::types::GovernanceDecision;

/// Decisions in insertion order plus the ledger's logical clock.
///
/// A state is never edited. Appending produces a new state and the old one
/// stays valid, so readers can hold a snapshot while a writer moves on.
/// Deserialization goes through [`create_state`], so a stored clock that
/// lags its decisions is fast-forwarded on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GovernanceSeed", into = "GovernanceSeed")]
pub struct GovernanceState {
    decisions: Vec<GovernanceDecision>,
    logical_clock: LogicalClock,
}

/// Seed for [`create_state`], typically restored from host storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSeed {
    pub decisions: Vec<GovernanceDecision>,
    pub logical_clock: Option<u64>,
}

impl GovernanceState {
    /// Decisions in insertion order (not necessarily time order).
    pub fn decisions(&self) -> &[GovernanceDecision] {
        &self.decisions
    }

    pub fn logical_clock(&self) -> LogicalClock {
        self.logical_clock
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn find(&self, governance_id: &str) -> Option<&GovernanceDecision> {
        self.decisions
            .iter()
            .find(|d| d.governance_id() == governance_id)
    }

    /// Chronological read view of this state's decisions.
    pub fn ledger(&self) -> Vec<GovernanceDecision> {
        get_ledger(&self.decisions)
    }

    pub(crate) fn with_clock(&self, logical_clock: LogicalClock) -> Self {
        Self {
            decisions: self.decisions.clone(),
            logical_clock,
        }
    }

    pub(crate) fn appended(
        &self,
        decision: GovernanceDecision,
        logical_clock: LogicalClock,
    ) -> Self {
        let mut decisions = Vec::with_capacity(self.decisions.len() + 1);
        decisions.extend_from_slice(&self.decisions);
        decisions.push(decision);
        Self {
            decisions,
            logical_clock,
        }
    }
}

impl From<GovernanceSeed> for GovernanceState {
    fn from(seed: GovernanceSeed) -> Self {
        create_state(Some(seed))
    }
}

impl From<GovernanceState> for GovernanceSeed {
    fn from(state: GovernanceState) -> Self {
        Self {
            decisions: state.decisions,
            logical_clock: Some(state.logical_clock.value()),
        }
    }
}

/// Build a state from an optional seed; the clock defaults to 0.
///
/// A seeded clock is fast-forwarded past every seeded decision's timestamp
/// so the next auto-timestamped append cannot reuse an existing generation.
pub fn create_state(seed: Option<GovernanceSeed>) -> GovernanceState {
    let seed = seed.unwrap_or_default();
    let clock = seed
        .decisions
        .iter()
        .fold(LogicalClock::new(seed.logical_clock.unwrap_or(0)), |clock, d| {
            clock.observe(d.created_at())
        });
    GovernanceState {
        decisions: seed.decisions,
        logical_clock: clock,
    }
}

/// Advance the clock by one and return the new state with its `g<N>` token.
pub fn advance_clock(state: &GovernanceState) -> GovernanceResult<(GovernanceState, LogicalTime)> {
    let (clock, token) = state.logical_clock.tick()?;
    Ok((state.with_clock(clock), token))
}

/// Decisions sorted ascending by logical time; the canonical read view.
pub fn get_ledger(decisions: &[GovernanceDecision]) -> Vec<GovernanceDecision> {
    chronological(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::GovernanceLedger;
    use crate::types::GovernanceDecisionInput;
    use std::sync::Arc;
    use steward_charter::Charter;

    #[test]
    fn empty_state_starts_at_zero() {
        let state = create_state(None);
        assert!(state.is_empty());
        assert_eq!(state.logical_clock().value(), 0);
    }

    #[test]
    fn seeded_clock_is_kept() {
        let state = create_state(Some(GovernanceSeed {
            decisions: vec![],
            logical_clock: Some(12),
        }));
        assert_eq!(state.logical_clock().value(), 12);
    }

    #[test]
    fn advance_leaves_original_untouched() {
        let state = create_state(None);
        let (next, token) = advance_clock(&state).unwrap();
        assert_eq!(token.to_string(), "g1");
        assert_eq!(next.logical_clock().value(), 1);
        assert_eq!(state.logical_clock().value(), 0);
    }

    #[test]
    fn advance_at_the_end_of_time_fails() {
        let state = create_state(Some(GovernanceSeed {
            decisions: vec![],
            logical_clock: Some(u64::MAX),
        }));
        assert!(advance_clock(&state).is_err());
    }

    #[test]
    fn lagging_stored_clock_is_fast_forwarded_on_load() {
        let ledger = GovernanceLedger::new(Arc::new(Charter::default()));
        let input = GovernanceDecisionInput::new("local_pod", "pod", "i", "j")
            .for_pod("pod-a")
            .at("g5");
        let (state, _) = ledger.append_decision(&create_state(None), input).unwrap();

        let mut json = serde_json::to_value(&state).unwrap();
        json["logical_clock"] = 0.into();
        let loaded: GovernanceState = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.logical_clock().value(), 5);

        let (_, token) = advance_clock(&loaded).unwrap();
        assert_eq!(token.to_string(), "g6");
    }

    #[test]
    fn stored_form_keeps_the_clock() {
        let state = create_state(Some(GovernanceSeed {
            decisions: vec![],
            logical_clock: Some(3),
        }));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["logical_clock"], 3);
        let back: GovernanceState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
