//! Irreversibility catalogue: the known points of no return and what each
//! one implies about an action's impact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, ExecutionResult};
use crate::impact_map::ActionImpactMap;
use crate::types::{
    ActionImpact, IrreversibilityApproval, IrreversibilityFallback, IrreversibilityReversibility,
    IrreversibilityScope,
};

/// A step after which the system cannot simply undo what happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrreversibilityPoint {
    pub point_id: String,
    pub description: String,
    pub affected_scope: IrreversibilityScope,
    pub reversibility: IrreversibilityReversibility,
    pub required_approvals: IrreversibilityApproval,
    pub fallback_behavior: IrreversibilityFallback,
    /// Action keys that cross this point.
    #[serde(default)]
    pub action_keys: Vec<String>,
}

impl IrreversibilityPoint {
    /// Impact implied by crossing this point.
    ///
    /// Reversibility sets the base (`low`, `medium`, `high`). Reaching the
    /// whole system or beyond escalates one step, and the approval
    /// requirement sets a floor (`medium` for a single human, `high` for the
    /// two-person rule).
    pub fn implied_impact(&self) -> ActionImpact {
        let base = match self.reversibility {
            IrreversibilityReversibility::Reversible => ActionImpact::Low,
            IrreversibilityReversibility::PartiallyReversible => ActionImpact::Medium,
            IrreversibilityReversibility::Irreversible => ActionImpact::High,
        };
        let scoped = if self.affected_scope >= IrreversibilityScope::System {
            base.escalate()
        } else {
            base
        };
        let floor = match self.required_approvals {
            IrreversibilityApproval::Automatic => ActionImpact::Low,
            IrreversibilityApproval::SingleHuman => ActionImpact::Medium,
            IrreversibilityApproval::TwoPersonRule => ActionImpact::High,
        };
        scoped.max(floor)
    }
}

/// Catalogue of irreversibility points keyed by `point_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IrreversibilityPoint>", into = "Vec<IrreversibilityPoint>")]
pub struct IrreversibilityCatalogue {
    points: BTreeMap<String, IrreversibilityPoint>,
}

impl IrreversibilityCatalogue {
    pub fn new(points: Vec<IrreversibilityPoint>) -> ExecutionResult<Self> {
        let mut map = BTreeMap::new();
        for point in points {
            if point.point_id.trim().is_empty() {
                return Err(ExecutionError::MissingField("point_id"));
            }
            if map.contains_key(&point.point_id) {
                return Err(ExecutionError::DuplicatePoint(point.point_id));
            }
            map.insert(point.point_id.clone(), point);
        }
        Ok(Self { points: map })
    }

    /// The catalogue shipped with the crate.
    pub fn builtin() -> Self {
        use IrreversibilityApproval as A;
        use IrreversibilityFallback as F;
        use IrreversibilityReversibility as R;
        use IrreversibilityScope as S;

        let point = |id: &str, description: &str, scope, rev, approvals, fallback, keys: &[&str]| {
            IrreversibilityPoint {
                point_id: id.to_string(),
                description: description.to_string(),
                affected_scope: scope,
                reversibility: rev,
                required_approvals: approvals,
                fallback_behavior: fallback,
                action_keys: keys.iter().map(|k| k.to_string()).collect(),
            }
        };

        let points = [
            point(
                "config_change",
                "Runtime configuration is replaced",
                S::Pod,
                R::Reversible,
                A::Automatic,
                F::Rollback,
                &["config.update"],
            ),
            point(
                "pod_restart",
                "A pod is restarted and loses in-flight work",
                S::Pod,
                R::Reversible,
                A::Automatic,
                F::Retry,
                &["pod.restart", "cache.flush"],
            ),
            point(
                "workload_reassignment",
                "Work is moved between pods",
                S::CrossPod,
                R::PartiallyReversible,
                A::SingleHuman,
                F::Rollback,
                &["workload.reassign"],
            ),
            point(
                "credential_rotation",
                "Credentials are rotated; old secrets stop working",
                S::CrossPod,
                R::PartiallyReversible,
                A::SingleHuman,
                F::Compensate,
                &["credentials.rotate"],
            ),
            point(
                "permission_grant",
                "A principal gains system-wide permissions",
                S::System,
                R::Reversible,
                A::SingleHuman,
                F::Rollback,
                &["permissions.grant"],
            ),
            point(
                "schema_migration",
                "Stored data is migrated to a new schema",
                S::System,
                R::PartiallyReversible,
                A::SingleHuman,
                F::Rollback,
                &["schema.migrate"],
            ),
            point(
                "external_notification",
                "A message leaves the system boundary",
                S::External,
                R::PartiallyReversible,
                A::SingleHuman,
                F::Compensate,
                &["external.notify"],
            ),
            point(
                "data_deletion",
                "Records are permanently deleted",
                S::System,
                R::Irreversible,
                A::TwoPersonRule,
                F::HaltAndAlert,
                &["data.delete"],
            ),
        ];

        Self {
            points: points
                .into_iter()
                .map(|p| (p.point_id.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, point_id: &str) -> Option<&IrreversibilityPoint> {
        self.points.get(point_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IrreversibilityPoint> {
        self.points.values()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Action map derived from the catalogue.
    ///
    /// An action key listed under several points takes the strongest
    /// implied impact.
    pub fn action_map(&self) -> ActionImpactMap {
        let mut map = ActionImpactMap::new();
        for point in self.points.values() {
            let impact = point.implied_impact();
            for key in &point.action_keys {
                let strongest = map.get(key).map_or(impact, |existing| existing.max(impact));
                map.insert(key, strongest);
            }
        }
        map
    }
}

impl TryFrom<Vec<IrreversibilityPoint>> for IrreversibilityCatalogue {
    type Error = ExecutionError;

    fn try_from(points: Vec<IrreversibilityPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<IrreversibilityCatalogue> for Vec<IrreversibilityPoint> {
    fn from(catalogue: IrreversibilityCatalogue) -> Self {
        catalogue.points.into_values().collect()
    }
}
