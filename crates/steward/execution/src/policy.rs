//! Read-only configuration for execution evaluation.

use std::collections::BTreeMap;
use std::sync::Arc;

use steward_charter::{Charter, TargetMatcher};

use crate::error::{ExecutionError, ExecutionResult};
use crate::impact_map::ActionImpactMap;
use crate::types::ReleaseGate;

/// Everything the evaluator needs besides the input itself.
#[derive(Clone, Debug)]
pub struct ExecutionPolicy {
    impact_map: ActionImpactMap,
    matcher: Arc<dyn TargetMatcher>,
    cooling_off: BTreeMap<ReleaseGate, u64>,
    drift_threshold: Option<f64>,
}

impl ExecutionPolicy {
    /// Built-in action map, no cooling-off defaults, no drift threshold.
    pub fn new(matcher: Arc<dyn TargetMatcher>) -> Self {
        Self {
            impact_map: ActionImpactMap::builtin(),
            matcher,
            cooling_off: BTreeMap::new(),
            drift_threshold: None,
        }
    }

    pub fn from_charter(charter: &Charter) -> Self {
        Self::new(charter.matcher())
    }

    pub fn with_impact_map(mut self, impact_map: ActionImpactMap) -> Self {
        self.impact_map = impact_map;
        self
    }

    /// Default cooling-off window for actions landing on `gate`.
    pub fn with_cooling_off(mut self, gate: ReleaseGate, window: u64) -> Self {
        self.cooling_off.insert(gate, window);
        self
    }

    /// Threshold applied when an input does not bring its own.
    pub fn with_drift_threshold(mut self, threshold: f64) -> ExecutionResult<Self> {
        self.drift_threshold = Some(unit_interval("drift_score_threshold", threshold)?);
        Ok(self)
    }

    pub fn impact_map(&self) -> &ActionImpactMap {
        &self.impact_map
    }

    pub fn matcher(&self) -> &Arc<dyn TargetMatcher> {
        &self.matcher
    }

    pub fn cooling_off_for(&self, gate: ReleaseGate) -> Option<u64> {
        self.cooling_off.get(&gate).copied()
    }

    pub fn drift_threshold(&self) -> Option<f64> {
        self.drift_threshold
    }
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::from_charter(&Charter::default())
    }
}

pub(crate) fn unit_interval(field: &'static str, value: f64) -> ExecutionResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ExecutionError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive_about_timing() {
        let policy = ExecutionPolicy::default();
        for &gate in ReleaseGate::ALL {
            assert_eq!(policy.cooling_off_for(gate), None);
        }
        assert_eq!(policy.drift_threshold(), None);
        assert!(!policy.impact_map().is_empty());
    }

    #[test]
    fn threshold_must_be_in_unit_interval() {
        assert!(ExecutionPolicy::default().with_drift_threshold(0.7).is_ok());
        assert!(ExecutionPolicy::default().with_drift_threshold(1.2).is_err());
        assert!(ExecutionPolicy::default().with_drift_threshold(f64::NAN).is_err());
    }

    #[test]
    fn cooling_off_per_gate() {
        let policy = ExecutionPolicy::default().with_cooling_off(ReleaseGate::HumanApproved, 3);
        assert_eq!(policy.cooling_off_for(ReleaseGate::HumanApproved), Some(3));
        assert_eq!(policy.cooling_off_for(ReleaseGate::Staged), None);
    }
}
