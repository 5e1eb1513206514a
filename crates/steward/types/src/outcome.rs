use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal classification of a single evaluation.
///
/// Every evaluation ends in exactly one of these: the action may proceed
/// (`executed`) or it is parked for human attention (`halted`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    Executed,
    Halted,
}

impl TerminalOutcome {
    pub fn is_executed(self) -> bool {
        matches!(self, Self::Executed)
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => write!(f, "executed"),
            Self::Halted => write!(f, "halted"),
        }
    }
}
