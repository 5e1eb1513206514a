use steward_charter::CharterError;
use steward_execution::ExecutionError;
use steward_governance::GovernanceError;
use thiserror::Error;

/// Errors surfaced by the host-side runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("telemetry error: {0}")]
    Telemetry(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    #[error(transparent)]
    Charter(#[from] CharterError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
