//! Serialize/restore boundary for host storage.

use std::path::Path;

use serde::{Deserialize, Serialize};
use steward_execution::ExecutionLedgerState;
use steward_governance::GovernanceState;
use tracing::info;

use crate::error::RuntimeResult;

/// Both ledger states, as a host would persist them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    pub governance: GovernanceState,
    pub execution: ExecutionLedgerState,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> RuntimeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> RuntimeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> RuntimeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        info!(
            path = %path.display(),
            decisions = self.governance.len(),
            records = self.execution.len(),
            "Ledger snapshot saved"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> RuntimeResult<Self> {
        let snapshot = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            decisions = snapshot.governance.len(),
            records = snapshot.execution.len(),
            "Ledger snapshot loaded"
        );
        Ok(snapshot)
    }
}
