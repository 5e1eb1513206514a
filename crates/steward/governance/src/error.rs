use steward_charter::TargetHit;
use steward_types::TokenError;
use thiserror::Error;

use crate::types::GovernanceScope;

/// Validation failures that abort an append.
///
/// These are caller errors, not policy outcomes: the input state is left
/// exactly as it was. Policy denials come back as values
/// ([`ExecutionPermit`](crate::ExecutionPermit),
/// [`GovernanceEvaluation`](crate::GovernanceEvaluation)).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("{scope} decisions must set requires_human_approval")]
    HumanApprovalRequired { scope: GovernanceScope },

    #[error("local_pod decisions must name a pod_id")]
    MissingPodId,

    #[error("cross_pod decisions must name at least one target pod")]
    MissingTargetPods,

    #[error("unknown invariants: {}", .0.join(", "))]
    UnknownInvariants(Vec<String>),

    #[error("forbidden optimization targets: {}", format_hits(.0))]
    ForbiddenTargets(Vec<TargetHit>),

    #[error("duplicate governance id: {0}")]
    DuplicateGovernanceId(String),
}

impl GovernanceError {
    /// Stable machine-readable code for hosts that branch on the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::Token(TokenError::InvalidEnum { .. }) => "invalid_enum",
            Self::Token(TokenError::InvalidLogicalTime(_)) => "invalid_logical_time",
            Self::Token(TokenError::ClockExhausted(_)) => "clock_exhausted",
            Self::HumanApprovalRequired { .. } => "human_approval_required",
            Self::MissingPodId => "missing_pod_id",
            Self::MissingTargetPods => "missing_target_pods",
            Self::UnknownInvariants(_) => "unknown_invariant",
            Self::ForbiddenTargets(_) => "forbidden_target",
            Self::DuplicateGovernanceId(_) => "duplicate_governance_id",
        }
    }
}

fn format_hits(hits: &[TargetHit]) -> String {
    hits.iter()
        .map(|h| format!("{:?} (matches {:?})", h.target, h.forbidden))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;
