use steward_types::TokenError;
use thiserror::Error;

use crate::evaluate::HoldReason;
use crate::types::ReleaseGate;

/// Malformed input to the execution ledger or its evaluator.
///
/// As with governance, a denial by policy is not an error: it comes back
/// as a SAFE_HOLD [`ExecutionEvaluation`](crate::ExecutionEvaluation).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("{field} must be a number in [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("release gate {declared} is laxer than the required {required}")]
    GateUnderstated {
        declared: ReleaseGate,
        required: ReleaseGate,
    },

    #[error("release gate {gate} requires human approval")]
    HumanApprovalRequired { gate: ReleaseGate },

    #[error("duplicate record id: {0}")]
    DuplicateRecordId(String),

    #[error("duplicate irreversibility point: {0}")]
    DuplicatePoint(String),

    #[error("execution of {action_key} is on hold: {}", format_reasons(.reasons))]
    NotAllowed {
        action_key: String,
        reasons: Vec<HoldReason>,
    },
}

impl ExecutionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::Token(TokenError::InvalidEnum { .. }) => "invalid_enum",
            Self::Token(TokenError::InvalidLogicalTime(_)) => "invalid_logical_time",
            Self::Token(TokenError::ClockExhausted(_)) => "clock_exhausted",
            Self::OutOfRange { .. } => "out_of_range",
            Self::GateUnderstated { .. } => "gate_understated",
            Self::HumanApprovalRequired { .. } => "human_approval_required",
            Self::DuplicateRecordId(_) => "duplicate_record_id",
            Self::DuplicatePoint(_) => "duplicate_point",
            Self::NotAllowed { .. } => "not_allowed",
        }
    }
}

fn format_reasons(reasons: &[HoldReason]) -> String {
    reasons
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
