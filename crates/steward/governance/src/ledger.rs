//! Validated appends to the governance ledger.

use std::collections::BTreeSet;
use std::sync::Arc;

use steward_charter::{Charter, TargetMatcher};
use steward_types::LogicalTime;
use tracing::{info, warn};

use crate::error::{GovernanceError, GovernanceResult};
use crate::state::GovernanceState;
use crate::types::{GovernanceDecision, GovernanceDecisionInput, GovernanceScope, Initiator};

/// Governance ledger. Validates decisions against the charter and appends
/// them to a state.
///
/// The ledger holds only read-only configuration. The decision history lives
/// in the [`GovernanceState`] values passed in and returned, so one ledger
/// can serve any number of states.
#[derive(Clone, Debug)]
pub struct GovernanceLedger {
    charter: Arc<Charter>,
    matcher: Arc<dyn TargetMatcher>,
}

impl GovernanceLedger {
    pub fn new(charter: Arc<Charter>) -> Self {
        let matcher = charter.matcher();
        Self { charter, matcher }
    }

    /// Swap in a different forbidden-target matcher.
    pub fn with_matcher(mut self, matcher: Arc<dyn TargetMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn charter(&self) -> &Charter {
        &self.charter
    }

    /// Validate `input`, timestamp it, and append it to a copy of `state`.
    ///
    /// On any validation failure the error is returned and `state` is
    /// untouched. A caller-supplied `created_at` fast-forwards the clock
    /// without emitting a new token; otherwise the clock ticks once and the
    /// new generation stamps the decision.
    pub fn append_decision(
        &self,
        state: &GovernanceState,
        input: GovernanceDecisionInput,
    ) -> GovernanceResult<(GovernanceState, GovernanceDecision)> {
        match self.build_decision(state, input) {
            Ok((decision, clock)) => {
                let next = state.appended(decision.clone(), clock);
                info!(
                    governance_id = %decision.governance_id(),
                    scope = %decision.scope(),
                    initiator = %decision.initiator(),
                    created_at = %decision.created_at(),
                    "Governance decision appended"
                );
                Ok((next, decision))
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "Governance decision rejected");
                Err(err)
            }
        }
    }

    fn build_decision(
        &self,
        state: &GovernanceState,
        input: GovernanceDecisionInput,
    ) -> GovernanceResult<(GovernanceDecision, steward_types::LogicalClock)> {
        let intent_id = required(input.intent_id, "intent_id")?;
        let justification = required(input.justification, "justification")?;

        let scope: GovernanceScope = input.scope.parse()?;
        let initiator: Initiator = input.initiator.parse()?;

        if scope.requires_human_approval() && !input.requires_human_approval {
            return Err(GovernanceError::HumanApprovalRequired { scope });
        }

        let pod_id = non_blank(input.pod_id);
        let target_pod_ids: BTreeSet<String> = input
            .target_pod_ids
            .into_iter()
            .filter_map(|p| non_blank(Some(p)))
            .collect();
        match scope {
            GovernanceScope::LocalPod if pod_id.is_none() => {
                return Err(GovernanceError::MissingPodId)
            }
            GovernanceScope::CrossPod if target_pod_ids.is_empty() => {
                return Err(GovernanceError::MissingTargetPods)
            }
            GovernanceScope::LocalPod | GovernanceScope::CrossPod | GovernanceScope::System => {}
        }

        let affected_invariants: BTreeSet<String> = input
            .affected_invariants
            .iter()
            .map(|id| id.trim().to_string())
            .collect();
        let registry = self.charter.registry();
        let unknown: Vec<String> = affected_invariants
            .iter()
            .filter(|id| !registry.contains(id))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(GovernanceError::UnknownInvariants(unknown));
        }

        let hits = self.matcher.forbidden_hits(&input.optimization_targets);
        if !hits.is_empty() {
            return Err(GovernanceError::ForbiddenTargets(hits));
        }

        let governance_id = match non_blank(input.governance_id) {
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };
        if state.find(&governance_id).is_some() {
            return Err(GovernanceError::DuplicateGovernanceId(governance_id));
        }

        let (created_at, clock) = match non_blank(input.created_at) {
            Some(raw) => {
                let supplied: LogicalTime = raw.parse()?;
                (supplied, state.logical_clock().observe(supplied))
            }
            None => {
                let (clock, token) = state.logical_clock().tick()?;
                (token, clock)
            }
        };

        let decision = GovernanceDecision::new(
            governance_id,
            scope,
            initiator,
            justification,
            affected_invariants,
            input.requires_human_approval,
            intent_id,
            pod_id,
            target_pod_ids,
            non_blank(input.decision_key),
            created_at,
        );
        Ok((decision, clock))
    }
}

fn required(value: String, field: &'static str) -> GovernanceResult<String> {
    if value.trim().is_empty() {
        Err(GovernanceError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_state;

    fn ledger() -> GovernanceLedger {
        GovernanceLedger::new(Arc::new(Charter::default()))
    }

    fn local(intent: &str) -> GovernanceDecisionInput {
        GovernanceDecisionInput::new("local_pod", "pod", intent, "rebalance queue").for_pod("pod-a")
    }

    #[test]
    fn local_append_auto_timestamps() {
        let state = create_state(None);
        let (next, decision) = ledger().append_decision(&state, local("intent-1")).unwrap();

        assert_eq!(decision.created_at().to_string(), "g1");
        assert_eq!(next.logical_clock().value(), 1);
        assert_eq!(next.len(), 1);
        assert!(state.is_empty());
        assert!(!decision.governance_id().is_empty());
    }

    #[test]
    fn missing_intent_and_justification() {
        let state = create_state(None);
        let mut input = local("  ");
        assert_eq!(
            ledger().append_decision(&state, input.clone()),
            Err(GovernanceError::MissingField("intent_id"))
        );
        input.intent_id = "i".into();
        input.justification = String::new();
        assert_eq!(
            ledger().append_decision(&state, input),
            Err(GovernanceError::MissingField("justification"))
        );
    }

    #[test]
    fn invalid_enum_tokens() {
        let state = create_state(None);
        let mut input = local("i");
        input.scope = "planet".into();
        let err = ledger().append_decision(&state, input).unwrap_err();
        assert_eq!(err.code(), "invalid_enum");

        let mut input = local("i");
        input.initiator = "robot".into();
        let err = ledger().append_decision(&state, input).unwrap_err();
        assert!(err.to_string().contains("initiator"));
    }

    #[test]
    fn wide_scopes_need_human_approval_flag() {
        let state = create_state(None);
        for scope in [GovernanceScope::CrossPod, GovernanceScope::System] {
            let input = GovernanceDecisionInput::new(scope, "human", "i", "j").targeting(["pod-b"]);
            assert_eq!(
                ledger().append_decision(&state, input),
                Err(GovernanceError::HumanApprovalRequired { scope })
            );
        }
    }

    #[test]
    fn scope_specific_pod_requirements() {
        let state = create_state(None);
        let input = GovernanceDecisionInput::new("local_pod", "pod", "i", "j").for_pod("  ");
        assert_eq!(
            ledger().append_decision(&state, input),
            Err(GovernanceError::MissingPodId)
        );

        let input = GovernanceDecisionInput::new("cross_pod", "human", "i", "j")
            .requiring_human_approval()
            .targeting([""]);
        assert_eq!(
            ledger().append_decision(&state, input),
            Err(GovernanceError::MissingTargetPods)
        );

        let input =
            GovernanceDecisionInput::new("system", "system", "i", "j").requiring_human_approval();
        assert!(ledger().append_decision(&state, input).is_ok());
    }

    #[test]
    fn invariants_are_normalized_and_checked() {
        let state = create_state(None);
        let input = local("i").affecting(["pod_isolation", " audit_trail", "pod_isolation"]);
        let (_, decision) = ledger().append_decision(&state, input).unwrap();
        let ids: Vec<_> = decision.affected_invariants().iter().cloned().collect();
        assert_eq!(ids, vec!["audit_trail", "pod_isolation"]);

        let input = local("i").affecting(["audit_trail", "made_up", "also_made_up"]);
        assert_eq!(
            ledger().append_decision(&state, input),
            Err(GovernanceError::UnknownInvariants(vec![
                "also_made_up".into(),
                "made_up".into()
            ]))
        );
    }

    #[test]
    fn forbidden_targets_list_all_offenders() {
        let state = create_state(None);
        let input =
            local("i").optimizing_for(["queue fairness", "Maximize Engagement", "data hoarding"]);
        match ledger().append_decision(&state, input) {
            Err(GovernanceError::ForbiddenTargets(hits)) => {
                let targets: Vec<_> = hits.iter().map(|h| h.target.as_str()).collect();
                assert_eq!(targets, vec!["Maximize Engagement", "data hoarding"]);
            }
            other => panic!("expected forbidden targets, got {other:?}"),
        }
    }

    #[test]
    fn supplied_created_at_never_rewinds() {
        let state = create_state(None);
        let (state, d) = ledger().append_decision(&state, local("a").at("g5")).unwrap();
        assert_eq!(d.created_at(), LogicalTime::new(5));
        assert_eq!(state.logical_clock().value(), 5);

        let (state, d) = ledger().append_decision(&state, local("b").at("g2")).unwrap();
        assert_eq!(d.created_at(), LogicalTime::new(2));
        assert_eq!(state.logical_clock().value(), 5);

        let (state, d) = ledger().append_decision(&state, local("c")).unwrap();
        assert_eq!(d.created_at(), LogicalTime::new(6));
        assert_eq!(state.logical_clock().value(), 6);
    }

    #[test]
    fn malformed_created_at_is_rejected() {
        let state = create_state(None);
        let err = ledger()
            .append_decision(&state, local("a").at("yesterday"))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_logical_time");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let state = create_state(None);
        let (state, _) = ledger()
            .append_decision(&state, local("a").with_id("gov-1"))
            .unwrap();
        assert_eq!(
            ledger().append_decision(&state, local("b").with_id("gov-1")),
            Err(GovernanceError::DuplicateGovernanceId("gov-1".into()))
        );
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn custom_matcher_replaces_denylist() {
        let matcher = Arc::new(steward_charter::ForbiddenTargets::new(["queue fairness"]));
        let ledger = ledger().with_matcher(matcher);
        let state = create_state(None);

        assert!(ledger
            .append_decision(&state, local("a").optimizing_for(["maximize engagement"]))
            .is_ok());
        assert!(ledger
            .append_decision(&state, local("a").optimizing_for(["Queue-Fairness"]))
            .is_err());
    }
}
