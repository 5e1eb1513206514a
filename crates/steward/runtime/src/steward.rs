//! Host facade bundling both ledgers.

use std::sync::Arc;

use steward_charter::Charter;
use steward_execution::{
    append_execution_record, create_execution_ledger_state, ExecutionDecisionInput,
    ExecutionEvaluation, ExecutionLedgerRecord, ExecutionLedgerState, ExecutionPolicy,
    ExecutionRecordInput,
};
use steward_governance::{
    can_execute_decision, create_state, ExecutionContext, ExecutionPermit, GovernanceDecision,
    GovernanceDecisionInput, GovernanceEvaluation, GovernanceLedger, GovernanceState,
};
use tracing::info;

use crate::cache::EvaluationCache;
use crate::config::StewardConfig;
use crate::error::RuntimeResult;
use crate::handle::LedgerHandle;
use crate::snapshot::LedgerSnapshot;

/// A configured governance ledger and execution ledger with their current
/// states behind single-writer handles.
#[derive(Debug)]
pub struct Steward {
    governance: GovernanceLedger,
    policy: ExecutionPolicy,
    governance_state: LedgerHandle<GovernanceState>,
    execution_state: LedgerHandle<ExecutionLedgerState>,
    cache: EvaluationCache,
}

impl Steward {
    pub fn new(charter: Arc<Charter>, policy: ExecutionPolicy) -> Self {
        Self {
            governance: GovernanceLedger::new(charter),
            policy,
            governance_state: LedgerHandle::new(create_state(None)),
            execution_state: LedgerHandle::new(create_execution_ledger_state(None)),
            cache: EvaluationCache::new(),
        }
    }

    pub fn from_config(config: &StewardConfig) -> RuntimeResult<Self> {
        let charter = config.charter.build()?;
        let policy = config.execution.build_policy(&charter)?;
        Ok(Self::new(Arc::new(charter), policy))
    }

    pub fn charter(&self) -> &Charter {
        self.governance.charter()
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    // ── Governance ──────────────────────────────────────────────────────

    pub fn record_decision(
        &self,
        input: GovernanceDecisionInput,
    ) -> RuntimeResult<GovernanceDecision> {
        self.governance_state
            .append(|state| self.governance.append_decision(state, input))
    }

    pub fn governance_state(&self) -> RuntimeResult<Arc<GovernanceState>> {
        self.governance_state.snapshot()
    }

    /// Classification of the current decision history, cached per state.
    pub fn governance_evaluation(&self) -> RuntimeResult<Arc<GovernanceEvaluation>> {
        let state = self.governance_state.snapshot()?;
        self.cache.evaluate(&state)
    }

    /// Permit for a recorded decision, or `None` if no such decision exists.
    pub fn can_execute(
        &self,
        governance_id: &str,
        context: &ExecutionContext,
    ) -> RuntimeResult<Option<ExecutionPermit>> {
        let state = self.governance_state.snapshot()?;
        Ok(state
            .find(governance_id)
            .map(|decision| can_execute_decision(decision, context)))
    }

    // ── Execution ───────────────────────────────────────────────────────

    pub fn evaluate_execution(
        &self,
        input: &ExecutionDecisionInput,
    ) -> RuntimeResult<ExecutionEvaluation> {
        Ok(self.policy.evaluate(input)?)
    }

    /// Evaluate `input` and, if allowed, record it.
    ///
    /// A held action is not an error: the evaluation comes back with no
    /// record so the host can branch on the reasons.
    pub fn authorize(
        &self,
        input: &ExecutionDecisionInput,
    ) -> RuntimeResult<(ExecutionEvaluation, Option<ExecutionLedgerRecord>)> {
        let evaluation = self.evaluate_execution(input)?;
        if !evaluation.is_allowed() {
            return Ok((evaluation, None));
        }
        let record_input = ExecutionRecordInput::from_evaluation(input, &evaluation)?;
        let record = self.record_execution(record_input)?;
        Ok((evaluation, Some(record)))
    }

    pub fn record_execution(
        &self,
        input: ExecutionRecordInput,
    ) -> RuntimeResult<ExecutionLedgerRecord> {
        self.execution_state
            .append(|state| append_execution_record(state, input))
    }

    pub fn execution_state(&self) -> RuntimeResult<Arc<ExecutionLedgerState>> {
        self.execution_state.snapshot()
    }

    // ── Storage ─────────────────────────────────────────────────────────

    // Both storage operations lock governance before execution, so they see
    // and install the two states as one pair.

    pub fn snapshot(&self) -> RuntimeResult<LedgerSnapshot> {
        let governance = self.governance_state.read()?;
        let execution = self.execution_state.read()?;
        Ok(LedgerSnapshot {
            governance: (**governance).clone(),
            execution: (**execution).clone(),
        })
    }

    /// Install both states from `snapshot` and drop any cached evaluation.
    pub fn restore(&self, snapshot: LedgerSnapshot) -> RuntimeResult<()> {
        let mut governance = self.governance_state.write()?;
        let mut execution = self.execution_state.write()?;
        *governance = Arc::new(snapshot.governance);
        *execution = Arc::new(snapshot.execution);
        self.cache.clear()?;
        info!(
            decisions = governance.len(),
            records = execution.len(),
            "Ledger state restored"
        );
        Ok(())
    }
}

impl Default for Steward {
    fn default() -> Self {
        Self::new(Arc::new(Charter::default()), ExecutionPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_execution::{ActionImpact, HoldReason, IrreversibilityScope};
    use steward_governance::{GovernanceMode, PermitReason};

    #[test]
    fn records_and_permits() {
        let steward = Steward::default();
        let decision = steward
            .record_decision(
                GovernanceDecisionInput::new("local_pod", "pod", "intent-1", "rebalance")
                    .for_pod("pod-a")
                    .with_id("gov-1"),
            )
            .unwrap();
        assert_eq!(decision.created_at().to_string(), "g1");

        let permit = steward
            .can_execute("gov-1", &ExecutionContext::pod("pod-a"))
            .unwrap()
            .unwrap();
        assert_eq!(permit, ExecutionPermit::allow(PermitReason::LocalPodScope));
        assert!(steward
            .can_execute("nope", &ExecutionContext::default())
            .unwrap()
            .is_none());
        assert!(steward.governance_evaluation().unwrap().is_clear());
    }

    #[test]
    fn authorize_records_only_allowed_actions() {
        let steward = Steward::default();
        let allowed = ExecutionDecisionInput::new(
            "config.update",
            "intent-1",
            ActionImpact::Low,
            IrreversibilityScope::Pod,
        )
        .checked();
        let (evaluation, record) = steward.authorize(&allowed).unwrap();
        assert!(evaluation.is_allowed());
        assert!(record.is_some());

        let mut held = allowed;
        held.constitution_passed = false;
        let (evaluation, record) = steward.authorize(&held).unwrap();
        assert_eq!(evaluation.reasons, vec![HoldReason::ConstitutionFailed]);
        assert!(record.is_none());
        assert_eq!(steward.execution_state().unwrap().len(), 1);
    }

    #[test]
    fn snapshot_and_restore() {
        let steward = Steward::default();
        steward
            .record_decision(
                GovernanceDecisionInput::new("system", "human", "i", "j")
                    .requiring_human_approval(),
            )
            .unwrap();
        let snapshot = steward.snapshot().unwrap();

        let fresh = Steward::default();
        fresh.restore(snapshot.clone()).unwrap();
        assert_eq!(fresh.snapshot().unwrap(), snapshot);
        assert_eq!(fresh.governance_state().unwrap().logical_clock().value(), 1);
    }

    fn keyed(intent: &str, id: &str) -> GovernanceDecisionInput {
        GovernanceDecisionInput::new("local_pod", "pod", intent, "j")
            .for_pod("p")
            .keyed("k1")
            .with_id(id)
    }

    #[test]
    fn restore_never_answers_from_the_previous_history() {
        let steward = Steward::default();
        steward.record_decision(keyed("a", "d1")).unwrap();
        steward.record_decision(keyed("a", "d2")).unwrap();
        assert!(steward.governance_evaluation().unwrap().is_clear());

        let other = Steward::default();
        other.record_decision(keyed("a", "d1")).unwrap();
        other.record_decision(keyed("b", "d2")).unwrap();
        let snapshot = other.snapshot().unwrap();
        assert_eq!(snapshot.governance.len(), 2);
        assert_eq!(snapshot.governance.logical_clock().value(), 2);

        steward.restore(snapshot).unwrap();
        let evaluation = steward.governance_evaluation().unwrap();
        assert_eq!(evaluation.mode, GovernanceMode::SafeHold);
        assert_eq!(evaluation.conflicts.len(), 1);
    }

    #[test]
    fn restore_installs_both_ledgers_together() {
        let source = Steward::default();
        source.record_decision(keyed("a", "d1")).unwrap();
        source
            .authorize(
                &ExecutionDecisionInput::new(
                    "config.update",
                    "intent-1",
                    ActionImpact::Low,
                    IrreversibilityScope::Pod,
                )
                .checked(),
            )
            .unwrap();
        let snapshot = source.snapshot().unwrap();

        let steward = Steward::default();
        let reader = steward.governance_state().unwrap();
        steward.restore(snapshot.clone()).unwrap();
        assert!(reader.is_empty());
        assert_eq!(steward.governance_state().unwrap().len(), 1);
        assert_eq!(steward.execution_state().unwrap().len(), 1);
        assert_eq!(steward.snapshot().unwrap(), snapshot);
    }
}
