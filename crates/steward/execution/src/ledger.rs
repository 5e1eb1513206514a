//! The execution ledger: an append-only record of actions that were
//! cleared to run.

use serde::{Deserialize, Serialize};
use steward_types::{chronological, LogicalClock, LogicalTime, Timestamped};
use tracing::{info, warn};

use crate::error::{ExecutionError, ExecutionResult};
use crate::evaluate::{ExecutionDecisionInput, ExecutionEvaluation};
use crate::types::{get_release_gate, ActionImpact, IrreversibilityScope, ReleaseGate};

// ── Record ─────────────────────────────────────────────────────────────

/// Record as submitted for appending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionRecordInput {
    /// Generated when absent.
    pub record_id: Option<String>,
    pub action_key: String,
    pub intent_id: String,
    pub action_impact: ActionImpact,
    /// Derived from scope and impact when absent; may be stricter, never laxer.
    pub release_gate: Option<ReleaseGate>,
    pub scope: IrreversibilityScope,
    pub rationale: String,
    pub cooling_off_window: Option<u64>,
    pub human_approval: bool,
    /// Externally supplied causal timestamp (`g<N>`).
    pub created_at: Option<String>,
}

impl ExecutionRecordInput {
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

    /// Record input for an action that `evaluation` allowed.
    ///
    /// The record carries the effective impact and gate the evaluator
    /// settled on. A held evaluation cannot be recorded.
    pub fn from_evaluation(
        input: &ExecutionDecisionInput,
        evaluation: &ExecutionEvaluation,
    ) -> ExecutionResult<Self> {
        if !evaluation.is_allowed() {
            return Err(ExecutionError::NotAllowed {
                action_key: input.action_key.clone(),
                reasons: evaluation.reasons.clone(),
            });
        }
        Ok(Self {
            record_id: None,
            action_key: input.action_key.clone(),
            intent_id: input.intent_id.clone(),
            action_impact: evaluation.effective_impact,
            release_gate: Some(evaluation.gate),
            scope: input.scope,
            rationale: input.rationale.clone(),
            cooling_off_window: evaluation.cooling_off_window,
            human_approval: input.human_approval,
            created_at: None,
        })
    }

    pub fn with_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn approved(mut self) -> Self {
        self.human_approval = true;
        self
    }

    pub fn at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

/// A frozen execution record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLedgerRecord {
    record_id: String,
    action_key: String,
    intent_id: String,
    action_impact: ActionImpact,
    release_gate: ReleaseGate,
    created_at: LogicalTime,
    scope: IrreversibilityScope,
    rationale: String,
    cooling_off_window: Option<u64>,
    human_approval: bool,
}

impl ExecutionLedgerRecord {
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn action_key(&self) -> &str {
        &self.action_key
    }

    pub fn intent_id(&self) -> &str {
        &self.intent_id
    }

    pub fn action_impact(&self) -> ActionImpact {
        self.action_impact
    }

    pub fn release_gate(&self) -> ReleaseGate {
        self.release_gate
    }

    pub fn created_at(&self) -> LogicalTime {
        self.created_at
    }

    pub fn scope(&self) -> IrreversibilityScope {
        self.scope
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn cooling_off_window(&self) -> Option<u64> {
        self.cooling_off_window
    }

    pub fn human_approval(&self) -> bool {
        self.human_approval
    }
}

impl Timestamped for ExecutionLedgerRecord {
    fn created_at(&self) -> LogicalTime {
        self.created_at
    }
}

// ── State ──────────────────────────────────────────────────────────────

/// Records in insertion order plus the ledger's logical clock.
///
/// Loads through [`create_execution_ledger_state`], so a stored clock is
/// never behind the records it came with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExecutionSeed", into = "ExecutionSeed")]
pub struct ExecutionLedgerState {
    records: Vec<ExecutionLedgerRecord>,
    logical_clock: LogicalClock,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSeed {
    pub records: Vec<ExecutionLedgerRecord>,
    pub logical_clock: Option<u64>,
}

impl ExecutionLedgerState {
    pub fn records(&self) -> &[ExecutionLedgerRecord] {
        &self.records
    }

    pub fn logical_clock(&self) -> LogicalClock {
        self.logical_clock
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, record_id: &str) -> Option<&ExecutionLedgerRecord> {
        self.records.iter().find(|r| r.record_id == record_id)
    }

    pub fn ledger(&self) -> Vec<ExecutionLedgerRecord> {
        get_execution_ledger(&self.records)
    }
}

impl From<ExecutionSeed> for ExecutionLedgerState {
    fn from(seed: ExecutionSeed) -> Self {
        create_execution_ledger_state(Some(seed))
    }
}

impl From<ExecutionLedgerState> for ExecutionSeed {
    fn from(state: ExecutionLedgerState) -> Self {
        Self {
            records: state.records,
            logical_clock: Some(state.logical_clock.value()),
        }
    }
}

pub fn create_execution_ledger_state(seed: Option<ExecutionSeed>) -> ExecutionLedgerState {
    let seed = seed.unwrap_or_default();
    let clock = seed
        .records
        .iter()
        .fold(LogicalClock::new(seed.logical_clock.unwrap_or(0)), |clock, r| {
            clock.observe(r.created_at)
        });
    ExecutionLedgerState {
        records: seed.records,
        logical_clock: clock,
    }
}

pub fn advance_execution_clock(
    state: &ExecutionLedgerState,
) -> ExecutionResult<(ExecutionLedgerState, LogicalTime)> {
    let (logical_clock, token) = state.logical_clock.tick()?;
    Ok((
        ExecutionLedgerState {
            records: state.records.clone(),
            logical_clock,
        },
        token,
    ))
}

/// Validate `input` and append it to a copy of `state`.
///
/// The record's gate may not be laxer than the gate its scope and impact
/// require, and a gate that needs a human needs `human_approval`.
pub fn append_execution_record(
    state: &ExecutionLedgerState,
    input: ExecutionRecordInput,
) -> ExecutionResult<(ExecutionLedgerState, ExecutionLedgerRecord)> {
    match build_record(state, input) {
        Ok((record, logical_clock)) => {
            let mut records = Vec::with_capacity(state.records.len() + 1);
            records.extend_from_slice(&state.records);
            records.push(record.clone());
            info!(
                record_id = %record.record_id,
                action_key = %record.action_key,
                gate = %record.release_gate,
                created_at = %record.created_at,
                "Execution record appended"
            );
            Ok((
                ExecutionLedgerState {
                    records,
                    logical_clock,
                },
                record,
            ))
        }
        Err(err) => {
            warn!(code = err.code(), error = %err, "Execution record rejected");
            Err(err)
        }
    }
}

fn build_record(
    state: &ExecutionLedgerState,
    input: ExecutionRecordInput,
) -> ExecutionResult<(ExecutionLedgerRecord, LogicalClock)> {
    let action_key = required(input.action_key, "action_key")?;
    let intent_id = required(input.intent_id, "intent_id")?;

    let required_gate = get_release_gate(input.scope, input.action_impact);
    let release_gate = input.release_gate.unwrap_or(required_gate);
    if release_gate < required_gate {
        return Err(ExecutionError::GateUnderstated {
            declared: release_gate,
            required: required_gate,
        });
    }
    if release_gate.requires_human_approval() && !input.human_approval {
        return Err(ExecutionError::HumanApprovalRequired { gate: release_gate });
    }

    let record_id = match non_blank(input.record_id) {
        Some(id) => id,
        None => uuid::Uuid::new_v4().to_string(),
    };
    if state.find(&record_id).is_some() {
        return Err(ExecutionError::DuplicateRecordId(record_id));
    }

    let (created_at, logical_clock) = match non_blank(input.created_at) {
        Some(raw) => {
            let supplied: LogicalTime = raw.parse()?;
            (supplied, state.logical_clock.observe(supplied))
        }
        None => {
            let (clock, token) = state.logical_clock.tick()?;
            (token, clock)
        }
    };

    let record = ExecutionLedgerRecord {
        record_id,
        action_key,
        intent_id,
        action_impact: input.action_impact,
        release_gate,
        created_at,
        scope: input.scope,
        rationale: input.rationale,
        cooling_off_window: input.cooling_off_window,
        human_approval: input.human_approval,
    };
    Ok((record, logical_clock))
}

/// Records sorted ascending by logical time.
pub fn get_execution_ledger(records: &[ExecutionLedgerRecord]) -> Vec<ExecutionLedgerRecord> {
    chronological(records)
}

fn required(value: String, field: &'static str) -> ExecutionResult<String> {
    if value.trim().is_empty() {
        Err(ExecutionError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
