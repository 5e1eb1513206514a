//! Execution decision evaluation.
//!
//! An evaluation never fails on policy grounds. Every unmet requirement is
//! accumulated as a [`HoldReason`] and the result is SAFE_HOLD; only
//! malformed input (a blank action key, an out-of-range score) is an error.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use steward_charter::TargetHit;
use steward_types::TerminalOutcome;
use tracing::{info, warn};

use crate::error::{ExecutionError, ExecutionResult};
use crate::impact_map::ActionImpactMap;
use crate::policy::{unit_interval, ExecutionPolicy};
use crate::types::{get_release_gate, ActionImpact, IrreversibilityScope, ReleaseGate};

// ── Input ──────────────────────────────────────────────────────────────

/// An action a caller is about to take, with the checks it has done.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionDecisionInput {
    pub action_key: String,
    pub intent_id: String,
    /// Impact the caller declares for the action.
    pub action_impact: ActionImpact,
    pub scope: IrreversibilityScope,
    pub invariants_passed: bool,
    pub constitution_passed: bool,
    pub human_approval: bool,
    /// Overrides the policy's per-gate default.
    pub cooling_off_window: Option<u64>,
    pub time_delay_elapsed: Option<bool>,
    pub drift_score: Option<f64>,
    /// Overrides the policy's threshold.
    pub drift_score_threshold: Option<f64>,
    pub declared_optimization_targets: Vec<String>,
    /// Dry run: waives the cooling-off and shadow-only requirements.
    pub mock_mode: bool,
    pub auto_execute_requested: bool,
    pub rationale: String,
    /// Consulted before the policy's action map.
    pub impact_map_override: Option<ActionImpactMap>,
}

impl ExecutionDecisionInput {
    pub fn new(
        action_key: impl Into<String>,
        intent_id: impl Into<String>,
        action_impact: ActionImpact,
        scope: IrreversibilityScope,
    ) -> Self {
        Self {
            action_key: action_key.into(),
            intent_id: intent_id.into(),
            action_impact,
            scope,
            ..Default::default()
        }
    }

    /// Mark invariant and constitution checks as passed.
    pub fn checked(mut self) -> Self {
        self.invariants_passed = true;
        self.constitution_passed = true;
        self
    }

    pub fn approved(mut self) -> Self {
        self.human_approval = true;
        self
    }

    pub fn auto_execute(mut self) -> Self {
        self.auto_execute_requested = true;
        self
    }

    pub fn mock(mut self) -> Self {
        self.mock_mode = true;
        self
    }

    pub fn with_drift(mut self, score: f64, threshold: Option<f64>) -> Self {
        self.drift_score = Some(score);
        self.drift_score_threshold = threshold;
        self
    }

    pub fn with_cooling_off(mut self, window: u64, elapsed: bool) -> Self {
        self.cooling_off_window = Some(window);
        self.time_delay_elapsed = Some(elapsed);
        self
    }

    pub fn optimizing_for<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_optimization_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn because(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }
}

// ── Result ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Allow,
    SafeHold,
}

/// One unmet requirement. Reported in the order they are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    MissingIntent,
    ImpactUnderstated,
    InvariantsFailed,
    ConstitutionFailed,
    HumanApprovalRequired,
    TimeDelayPending,
    DriftScoreMissing,
    DriftBelowThreshold,
    ForbiddenTarget,
    ShadowOnlyGate,
}

impl HoldReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingIntent => "missing_intent",
            Self::ImpactUnderstated => "impact_understated",
            Self::InvariantsFailed => "invariants_failed",
            Self::ConstitutionFailed => "constitution_failed",
            Self::HumanApprovalRequired => "human_approval_required",
            Self::TimeDelayPending => "time_delay_pending",
            Self::DriftScoreMissing => "drift_score_missing",
            Self::DriftBelowThreshold => "drift_below_threshold",
            Self::ForbiddenTarget => "forbidden_target",
            Self::ShadowOnlyGate => "shadow_only_gate",
        }
    }
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one [`ExecutionDecisionInput`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvaluation {
    pub status: ExecutionStatus,
    pub gate: ReleaseGate,
    /// Impact as declared by the caller.
    pub action_impact: ActionImpact,
    /// Impact the action map demands, if it knows the action.
    pub required_impact: Option<ActionImpact>,
    /// The stronger of the two; the gate is derived from this.
    pub effective_impact: ActionImpact,
    pub allow_auto_execute: bool,
    pub reasons: Vec<HoldReason>,
    pub forbidden_hits: Vec<TargetHit>,
    /// Cooling-off window that applied, from the input or the policy.
    pub cooling_off_window: Option<u64>,
    pub terminal_outcome: TerminalOutcome,
}

impl ExecutionEvaluation {
    pub fn is_allowed(&self) -> bool {
        self.status == ExecutionStatus::Allow
    }
}

// ── Evaluator ──────────────────────────────────────────────────────────

impl ExecutionPolicy {
    /// Evaluate `input` against this policy.
    pub fn evaluate(&self, input: &ExecutionDecisionInput) -> ExecutionResult<ExecutionEvaluation> {
        if input.action_key.trim().is_empty() {
            return Err(ExecutionError::MissingField("action_key"));
        }
        let drift_score = input
            .drift_score
            .map(|s| unit_interval("drift_score", s))
            .transpose()?;
        let threshold = match input.drift_score_threshold {
            Some(t) => Some(unit_interval("drift_score_threshold", t)?),
            None => self.drift_threshold(),
        };

        let required_impact = input
            .impact_map_override
            .as_ref()
            .and_then(|map| map.get(&input.action_key))
            .or_else(|| self.impact_map().get(&input.action_key));
        let effective_impact = required_impact.map_or(input.action_impact, |required| {
            required.max(input.action_impact)
        });
        let gate = get_release_gate(input.scope, effective_impact);
        let cooling_off_window = input
            .cooling_off_window
            .or_else(|| self.cooling_off_for(gate));
        let forbidden_hits = self
            .matcher()
            .forbidden_hits(&input.declared_optimization_targets);

        let mut reasons = Vec::new();
        if input.intent_id.trim().is_empty() {
            reasons.push(HoldReason::MissingIntent);
        }
        if required_impact.is_some_and(|required| input.action_impact < required) {
            reasons.push(HoldReason::ImpactUnderstated);
        }
        if !input.invariants_passed {
            reasons.push(HoldReason::InvariantsFailed);
        }
        if !input.constitution_passed {
            reasons.push(HoldReason::ConstitutionFailed);
        }
        if gate.requires_human_approval() && !input.human_approval {
            reasons.push(HoldReason::HumanApprovalRequired);
        }
        let cooling = cooling_off_window.is_some_and(|window| window > 0);
        if cooling && !input.mock_mode && input.time_delay_elapsed != Some(true) {
            reasons.push(HoldReason::TimeDelayPending);
        }
        if let Some(threshold) = threshold {
            match drift_score {
                None => reasons.push(HoldReason::DriftScoreMissing),
                Some(score) if score < threshold => reasons.push(HoldReason::DriftBelowThreshold),
                Some(_) => {}
            }
        }
        if !forbidden_hits.is_empty() {
            reasons.push(HoldReason::ForbiddenTarget);
        }
        if gate == ReleaseGate::ShadowOnly && !input.mock_mode {
            reasons.push(HoldReason::ShadowOnlyGate);
        }

        let (status, terminal_outcome) = if reasons.is_empty() {
            (ExecutionStatus::Allow, TerminalOutcome::Executed)
        } else {
            (ExecutionStatus::SafeHold, TerminalOutcome::Halted)
        };
        let evaluation = ExecutionEvaluation {
            status,
            gate,
            action_impact: input.action_impact,
            required_impact,
            effective_impact,
            allow_auto_execute: status == ExecutionStatus::Allow && input.auto_execute_requested,
            reasons,
            forbidden_hits,
            cooling_off_window,
            terminal_outcome,
        };

        if evaluation.is_allowed() {
            info!(
                action_key = %input.action_key,
                gate = %evaluation.gate,
                impact = %evaluation.effective_impact,
                auto_execute = evaluation.allow_auto_execute,
                mock = input.mock_mode,
                "Execution allowed"
            );
        } else {
            warn!(
                action_key = %input.action_key,
                gate = %evaluation.gate,
                reasons = ?evaluation.reasons,
                "Execution held"
            );
        }
        Ok(evaluation)
    }
}

/// Evaluate `input` against the default policy.
pub fn evaluate_execution_decision(
    input: &ExecutionDecisionInput,
) -> ExecutionResult<ExecutionEvaluation> {
    static DEFAULT: OnceLock<ExecutionPolicy> = OnceLock::new();
    DEFAULT.get_or_init(ExecutionPolicy::default).evaluate(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: ExecutionDecisionInput) -> ExecutionEvaluation {
        evaluate_execution_decision(&input).unwrap()
    }

    fn low_pod() -> ExecutionDecisionInput {
        ExecutionDecisionInput::new(
            "config.update",
            "intent-1",
            ActionImpact::Low,
            IrreversibilityScope::Pod,
        )
        .checked()
    }

    #[test]
    fn clean_low_impact_action_is_allowed() {
        let evaluation = eval(low_pod().auto_execute());
        assert_eq!(evaluation.status, ExecutionStatus::Allow);
        assert_eq!(evaluation.gate, ReleaseGate::Live);
        assert!(evaluation.allow_auto_execute);
        assert_eq!(evaluation.terminal_outcome, TerminalOutcome::Executed);
        assert!(evaluation.reasons.is_empty());
    }

    #[test]
    fn auto_execute_only_when_requested() {
        assert!(!eval(low_pod()).allow_auto_execute);
    }

    #[test]
    fn understated_impact_is_held_and_gated_by_required() {
        let input = ExecutionDecisionInput::new(
            "data.delete",
            "intent-1",
            ActionImpact::Low,
            IrreversibilityScope::Pod,
        )
        .checked()
        .approved();
        let evaluation = eval(input);
        assert_eq!(evaluation.required_impact, Some(ActionImpact::Critical));
        assert_eq!(evaluation.effective_impact, ActionImpact::Critical);
        assert_eq!(evaluation.gate, ReleaseGate::HumanApproved);
        assert_eq!(evaluation.reasons, vec![HoldReason::ImpactUnderstated]);
        assert_eq!(evaluation.terminal_outcome, TerminalOutcome::Halted);
    }

    #[test]
    fn reasons_accumulate_in_check_order() {
        let input = ExecutionDecisionInput::new(
            "schema.migrate",
            " ",
            ActionImpact::High,
            IrreversibilityScope::System,
        )
        .optimizing_for(["attention capture"])
        .with_drift(0.2, Some(0.5));
        let evaluation = eval(input.auto_execute());
        assert_eq!(
            evaluation.reasons,
            vec![
                HoldReason::MissingIntent,
                HoldReason::InvariantsFailed,
                HoldReason::ConstitutionFailed,
                HoldReason::HumanApprovalRequired,
                HoldReason::DriftBelowThreshold,
                HoldReason::ForbiddenTarget,
            ]
        );
        assert_eq!(evaluation.forbidden_hits.len(), 1);
        assert!(!evaluation.allow_auto_execute);
    }

    #[test]
    fn drift_threshold_without_score() {
        let mut input = low_pod();
        input.drift_score_threshold = Some(0.5);
        assert_eq!(eval(input).reasons, vec![HoldReason::DriftScoreMissing]);

        let input = low_pod().with_drift(0.5, Some(0.5));
        assert!(eval(input).is_allowed());
    }

    #[test]
    fn cooling_off_and_mock_mode() {
        let pending = low_pod().with_cooling_off(10, false);
        assert_eq!(eval(pending.clone()).reasons, vec![HoldReason::TimeDelayPending]);
        assert!(eval(pending.mock()).is_allowed());
        assert!(eval(low_pod().with_cooling_off(10, true)).is_allowed());
        assert!(eval(low_pod().with_cooling_off(0, false)).is_allowed());
    }

    #[test]
    fn policy_cooling_off_applies_per_gate() {
        let policy = ExecutionPolicy::default().with_cooling_off(ReleaseGate::Live, 5);
        let evaluation = policy.evaluate(&low_pod()).unwrap();
        assert_eq!(evaluation.cooling_off_window, Some(5));
        assert_eq!(evaluation.reasons, vec![HoldReason::TimeDelayPending]);

        let overridden = policy.evaluate(&low_pod().with_cooling_off(0, false)).unwrap();
        assert!(overridden.is_allowed());
    }

    #[test]
    fn shadow_only_gate_needs_mock_mode() {
        let input = ExecutionDecisionInput::new(
            "data.delete",
            "intent-1",
            ActionImpact::Critical,
            IrreversibilityScope::System,
        )
        .checked()
        .approved();
        let live = eval(input.clone());
        assert_eq!(live.gate, ReleaseGate::ShadowOnly);
        assert_eq!(live.reasons, vec![HoldReason::ShadowOnlyGate]);

        let shadow = eval(input.clone().mock());
        assert!(shadow.is_allowed());

        let mut unapproved = input.mock();
        unapproved.human_approval = false;
        assert_eq!(
            eval(unapproved).reasons,
            vec![HoldReason::HumanApprovalRequired]
        );
    }

    #[test]
    fn mock_mode_never_waives_policy_checks() {
        let mut input = low_pod().mock();
        input.invariants_passed = false;
        assert_eq!(eval(input).reasons, vec![HoldReason::InvariantsFailed]);
    }

    #[test]
    fn impact_override_is_consulted_first() {
        let mut input = low_pod();
        input.impact_map_override =
            Some([("config.update", ActionImpact::High)].into_iter().collect());
        let evaluation = eval(input);
        assert_eq!(evaluation.required_impact, Some(ActionImpact::High));
        assert_eq!(evaluation.gate, ReleaseGate::Staged);
        assert_eq!(evaluation.reasons, vec![HoldReason::ImpactUnderstated]);
    }

    #[test]
    fn malformed_inputs_are_errors() {
        let mut input = low_pod();
        input.action_key = "  ".into();
        assert_eq!(
            evaluate_execution_decision(&input),
            Err(ExecutionError::MissingField("action_key"))
        );

        let input = low_pod().with_drift(1.5, None);
        assert_eq!(
            evaluate_execution_decision(&input).unwrap_err().code(),
            "out_of_range"
        );
    }

    #[test]
    fn unknown_action_uses_declared_impact() {
        let input = ExecutionDecisionInput::new(
            "report.render",
            "intent-1",
            ActionImpact::Medium,
            IrreversibilityScope::CrossPod,
        )
        .checked();
        let evaluation = eval(input);
        assert_eq!(evaluation.required_impact, None);
        assert_eq!(evaluation.gate, ReleaseGate::Staged);
        assert!(evaluation.is_allowed());
    }
}
