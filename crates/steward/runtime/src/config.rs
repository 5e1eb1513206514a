//! Steward configuration, loaded from TOML.
//!
//! ```toml
//! [charter]
//! purpose = "Coordinate pods without eroding human oversight"
//! non_goals = ["maximize engagement"]
//!
//! [[charter.invariants]]
//! id = "audit_trail"
//! description = "Every execution is logged"
//! never_optimize_for = ["audit suppression"]
//!
//! [execution]
//! drift_threshold = 0.6
//!
//! [execution.action_impacts]
//! "billing.export" = "high"
//!
//! [execution.cooling_off]
//! human_approved = 3
//!
//! [telemetry]
//! level = "info"
//! json = false
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use steward_charter::{Charter, Constitution, Invariant, InvariantRegistry};
use steward_execution::{ActionImpact, ActionImpactMap, ExecutionPolicy, ReleaseGate};
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "STEWARD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StewardConfig {
    pub charter: CharterConfig,
    pub execution: ExecutionConfig,
    pub telemetry: TelemetryConfig,
}

/// Charter overrides. Anything left out falls back to the built-in charter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharterConfig {
    pub purpose: Option<String>,
    pub non_goals: Option<Vec<String>>,
    pub invariants: Option<Vec<Invariant>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Layered over the built-in action map.
    pub action_impacts: BTreeMap<String, ActionImpact>,
    /// Start from an empty action map instead of the built-in one.
    pub replace_builtin_actions: bool,
    /// Release gate token → default cooling-off window.
    pub cooling_off: BTreeMap<String, u64>,
    pub drift_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

impl StewardConfig {
    /// Load configuration.
    ///
    /// Looks at `path`, then `$STEWARD_CONFIG`, then
    /// `<config_dir>/steward/config.toml`. A missing file yields the
    /// defaults; a malformed or invalid one is an error.
    pub fn load(path: Option<&Path>) -> RuntimeResult<Self> {
        match resolve_path(path, std::env::var_os(CONFIG_ENV)) {
            Some(config_path) if config_path.exists() => {
                debug!(path = %config_path.display(), "Loading steward config");
                let contents = std::fs::read_to_string(&config_path)?;
                Self::from_toml_str(&contents)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(contents: &str) -> RuntimeResult<Self> {
        let config: StewardConfig =
            toml::from_str(contents).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> RuntimeResult<String> {
        toml::to_string_pretty(self).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        self.charter.build()?;
        self.execution.build_policy(&Charter::default())?;
        Ok(())
    }
}

impl CharterConfig {
    pub fn build(&self) -> RuntimeResult<Charter> {
        let registry = match &self.invariants {
            Some(invariants) => InvariantRegistry::new(invariants.clone())?,
            None => InvariantRegistry::builtin(),
        };
        let builtin = Constitution::builtin();
        let constitution = Constitution::new(
            self.purpose.clone().unwrap_or_else(|| builtin.purpose().to_string()),
            self.non_goals
                .clone()
                .unwrap_or_else(|| builtin.non_goals().to_vec()),
        );
        Ok(Charter::new(registry, constitution))
    }
}

impl ExecutionConfig {
    pub fn build_policy(&self, charter: &Charter) -> RuntimeResult<ExecutionPolicy> {
        let overrides: ActionImpactMap = self
            .action_impacts
            .iter()
            .map(|(key, impact)| (key.as_str(), *impact))
            .collect();
        let impact_map = if self.replace_builtin_actions {
            overrides
        } else {
            ActionImpactMap::builtin().layered(&overrides)
        };

        let mut policy = ExecutionPolicy::from_charter(charter).with_impact_map(impact_map);
        for (gate, window) in &self.cooling_off {
            let gate: ReleaseGate = gate
                .parse()
                .map_err(|e| RuntimeError::Config(format!("cooling_off: {e}")))?;
            policy = policy.with_cooling_off(gate, *window);
        }
        if let Some(threshold) = self.drift_threshold {
            policy = policy
                .with_drift_threshold(threshold)
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
        }
        Ok(policy)
    }
}

fn resolve_path(explicit: Option<&Path>, env: Option<OsString>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|dir| dir.join("steward").join("config.toml")))
}
