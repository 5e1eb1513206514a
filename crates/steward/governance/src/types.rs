//! Governance decisions, their inputs, and the structured results the
//! ledger hands back to hosts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_types::{normalize_token, LogicalTime, TerminalOutcome, Timestamped, TokenError};

// ── Scope & Initiator ──────────────────────────────────────────────────

/// How far a decision reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceScope {
    /// Confined to a single pod.
    LocalPod,
    /// Reaches into one or more other pods.
    CrossPod,
    /// Affects the whole system.
    System,
}

impl GovernanceScope {
    pub const ALL: [GovernanceScope; 3] = [Self::LocalPod, Self::CrossPod, Self::System];

    /// Anything wider than a single pod needs a human in the loop.
    pub fn requires_human_approval(self) -> bool {
        match self {
            Self::LocalPod => false,
            Self::CrossPod | Self::System => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalPod => "local_pod",
            Self::CrossPod => "cross_pod",
            Self::System => "system",
        }
    }
}

impl fmt::Display for GovernanceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GovernanceScope {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == token)
            .ok_or_else(|| TokenError::InvalidEnum {
                kind: "scope",
                value: s.to_string(),
            })
    }
}

impl From<GovernanceScope> for String {
    fn from(scope: GovernanceScope) -> Self {
        scope.as_str().to_string()
    }
}

/// Who initiated (or is executing) a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initiator {
    Human,
    Pod,
    System,
}

impl Initiator {
    pub const ALL: [Initiator; 3] = [Self::Human, Self::Pod, Self::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Pod => "pod",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Initiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Initiator {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        Self::ALL
            .into_iter()
            .find(|initiator| initiator.as_str() == token)
            .ok_or_else(|| TokenError::InvalidEnum {
                kind: "initiator",
                value: s.to_string(),
            })
    }
}

impl From<Initiator> for String {
    fn from(initiator: Initiator) -> Self {
        initiator.as_str().to_string()
    }
}

// ── Decision Input ─────────────────────────────────────────────────────

/// Untyped decision as submitted by a host.
///
/// Scope and initiator arrive as tokens and are only parsed during
/// validation, so a bad token surfaces as a validation error rather than a
/// deserialization failure somewhere upstream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceDecisionInput {
    /// Generated when absent.
    pub governance_id: Option<String>,
    pub scope: String,
    pub initiator: String,
    pub justification: String,
    pub affected_invariants: Vec<String>,
    pub requires_human_approval: bool,
    pub intent_id: String,
    pub pod_id: Option<String>,
    pub target_pod_ids: Vec<String>,
    pub decision_key: Option<String>,
    /// Optimization targets the decision declares it pursues.
    pub optimization_targets: Vec<String>,
    /// Externally supplied causal timestamp (`g<N>`).
    pub created_at: Option<String>,
}

impl GovernanceDecisionInput {
    pub fn new(
        scope: impl Into<String>,
        initiator: impl Into<String>,
        intent_id: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            initiator: initiator.into(),
            intent_id: intent_id.into(),
            justification: justification.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, governance_id: impl Into<String>) -> Self {
        self.governance_id = Some(governance_id.into());
        self
    }

    pub fn for_pod(mut self, pod_id: impl Into<String>) -> Self {
        self.pod_id = Some(pod_id.into());
        self
    }

    pub fn targeting<I, S>(mut self, pods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_pod_ids.extend(pods.into_iter().map(Into::into));
        self
    }

    pub fn affecting<I, S>(mut self, invariants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_invariants
            .extend(invariants.into_iter().map(Into::into));
        self
    }

    pub fn optimizing_for<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optimization_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn requiring_human_approval(mut self) -> Self {
        self.requires_human_approval = true;
        self
    }

    pub fn keyed(mut self, decision_key: impl Into<String>) -> Self {
        self.decision_key = Some(decision_key.into());
        self
    }

    pub fn at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }
}

// ── Decision ───────────────────────────────────────────────────────────

/// A validated, timestamped governance decision.
///
/// Only the ledger constructs these, and nothing exposes a mutator: once
/// appended a decision is frozen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceDecision {
    governance_id: String,
    scope: GovernanceScope,
    initiator: Initiator,
    justification: String,
    affected_invariants: BTreeSet<String>,
    requires_human_approval: bool,
    intent_id: String,
    pod_id: Option<String>,
    target_pod_ids: BTreeSet<String>,
    decision_key: Option<String>,
    created_at: LogicalTime,
}

impl GovernanceDecision {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        governance_id: String,
        scope: GovernanceScope,
        initiator: Initiator,
        justification: String,
        affected_invariants: BTreeSet<String>,
        requires_human_approval: bool,
        intent_id: String,
        pod_id: Option<String>,
        target_pod_ids: BTreeSet<String>,
        decision_key: Option<String>,
        created_at: LogicalTime,
    ) -> Self {
        Self {
            governance_id,
            scope,
            initiator,
            justification,
            affected_invariants,
            requires_human_approval,
            intent_id,
            pod_id,
            target_pod_ids,
            decision_key,
            created_at,
        }
    }

    pub fn governance_id(&self) -> &str {
        &self.governance_id
    }

    pub fn scope(&self) -> GovernanceScope {
        self.scope
    }

    pub fn initiator(&self) -> Initiator {
        self.initiator
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }

    pub fn affected_invariants(&self) -> &BTreeSet<String> {
        &self.affected_invariants
    }

    pub fn requires_human_approval(&self) -> bool {
        self.requires_human_approval
    }

    pub fn intent_id(&self) -> &str {
        &self.intent_id
    }

    pub fn pod_id(&self) -> Option<&str> {
        self.pod_id.as_deref()
    }

    pub fn target_pod_ids(&self) -> &BTreeSet<String> {
        &self.target_pod_ids
    }

    pub fn decision_key(&self) -> Option<&str> {
        self.decision_key.as_deref()
    }

    /// Key used to group decisions that claim to govern the same thing:
    /// the decision key, or the governance id when no key was given.
    pub fn grouping_key(&self) -> &str {
        self.decision_key().unwrap_or(&self.governance_id)
    }

    pub fn created_at(&self) -> LogicalTime {
        self.created_at
    }
}

impl Timestamped for GovernanceDecision {
    fn created_at(&self) -> LogicalTime {
        self.created_at
    }
}

// ── Execution Permit ───────────────────────────────────────────────────

/// Runtime facts about who is about to act on a decision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionContext {
    pub initiator: Option<Initiator>,
    pub pod_id: Option<String>,
    /// Whether a human approval was actually granted; absent means no.
    pub approval_granted: Option<bool>,
}

impl ExecutionContext {
    pub fn human(approval_granted: bool) -> Self {
        Self {
            initiator: Some(Initiator::Human),
            pod_id: None,
            approval_granted: Some(approval_granted),
        }
    }

    pub fn pod(pod_id: impl Into<String>) -> Self {
        Self {
            initiator: Some(Initiator::Pod),
            pod_id: Some(pod_id.into()),
            approval_granted: None,
        }
    }
}

/// Why a decision may or may not be executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitReason {
    HumanApproved,
    LocalPodScope,
    HumanApprovalRequired,
    HumanExecutorRequired,
    PodScopeMismatch,
}

impl PermitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HumanApproved => "human_approved",
            Self::LocalPodScope => "local_pod_scope",
            Self::HumanApprovalRequired => "human_approval_required",
            Self::HumanExecutorRequired => "human_executor_required",
            Self::PodScopeMismatch => "pod_scope_mismatch",
        }
    }
}

impl fmt::Display for PermitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking whether a decision may be executed now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPermit {
    pub ok: bool,
    pub reason: PermitReason,
}

impl ExecutionPermit {
    pub fn allow(reason: PermitReason) -> Self {
        Self { ok: true, reason }
    }

    pub fn deny(reason: PermitReason) -> Self {
        Self { ok: false, reason }
    }
}

// ── Conflicts & Evaluation ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    IntentConflict,
    JustificationConflict,
}

/// Two or more decisions under one key that disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConflict {
    pub decision_key: String,
    pub governance_ids: Vec<String>,
    pub reasons: Vec<ConflictReason>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceMode {
    Clear,
    SafeHold,
}

/// Classification of an entire decision history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceEvaluation {
    pub mode: GovernanceMode,
    /// Set while conflicts hold the ledger; a human must resolve them.
    pub requires_human_approval: bool,
    pub conflicts: Vec<GovernanceConflict>,
    pub terminal_outcome: TerminalOutcome,
}

impl GovernanceEvaluation {
    pub fn is_clear(&self) -> bool {
        self.mode == GovernanceMode::Clear
    }
}
