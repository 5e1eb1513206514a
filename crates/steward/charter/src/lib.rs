//! # steward-charter
//!
//! The read-only configuration both ledgers validate against.
//!
//! ## Core Components
//!
//! - **InvariantRegistry**: the catalogue of named invariants a decision may
//!   declare it affects, each with the targets it must never be optimized for
//! - **Constitution**: the system purpose and its non-goals
//! - **ForbiddenTargets**: the combined, normalized denylist drawn from both,
//!   behind the replaceable [`TargetMatcher`] seam
//! - **drift**: the [0,1] health score over violation and approval-gap counts
//!
//! A [`Charter`] bundles the registry and constitution and precomputes the
//! forbidden-target set once at startup.

#![deny(unsafe_code)]

pub mod constitution;
pub mod drift;
pub mod error;
pub mod invariant;
pub mod targets;

use std::sync::Arc;

pub use constitution::Constitution;
pub use drift::{drift_score, score_with, DriftInputs, DriftWeights};
pub use error::{CharterError, CharterResult};
pub use invariant::{Invariant, InvariantRegistry};
pub use targets::{normalize_target, ForbiddenTargets, TargetHit, TargetMatcher};

/// Invariant registry plus constitution, with the forbidden-target set
/// derived from both.
#[derive(Clone, Debug)]
pub struct Charter {
    registry: InvariantRegistry,
    constitution: Constitution,
    forbidden: Arc<ForbiddenTargets>,
}

impl Charter {
    pub fn new(registry: InvariantRegistry, constitution: Constitution) -> Self {
        let forbidden = Arc::new(ForbiddenTargets::from_charter(&registry, &constitution));
        Self {
            registry,
            constitution,
            forbidden,
        }
    }

    pub fn registry(&self) -> &InvariantRegistry {
        &self.registry
    }

    pub fn constitution(&self) -> &Constitution {
        &self.constitution
    }

    pub fn forbidden_targets(&self) -> &ForbiddenTargets {
        &self.forbidden
    }

    /// The default matcher for ledgers built on this charter.
    pub fn matcher(&self) -> Arc<dyn TargetMatcher> {
        self.forbidden.clone()
    }
}

impl Default for Charter {
    fn default() -> Self {
        Self::new(InvariantRegistry::builtin(), Constitution::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_charter_combines_both_sources() {
        let charter = Charter::default();
        let forbidden = charter.forbidden_targets();

        for goal in charter.constitution().non_goals() {
            assert!(forbidden.contains(goal));
        }
        for invariant in charter.registry().iter() {
            for target in &invariant.never_optimize_for {
                assert!(forbidden.contains(target));
            }
        }
    }

    #[test]
    fn matcher_shares_the_precomputed_set() {
        let charter = Charter::default();
        let hits = charter
            .matcher()
            .forbidden_hits(&["Maximize Engagement!".to_string(), "latency".to_string()]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, "Maximize Engagement!");
    }
}
