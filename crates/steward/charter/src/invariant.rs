//! Invariant registry: the fixed catalogue of named invariants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CharterError, CharterResult};

/// A named invariant a governance decision may declare it affects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invariant {
    pub id: String,
    pub description: String,
    /// Optimization targets that would erode this invariant.
    #[serde(default)]
    pub never_optimize_for: Vec<String>,
}

impl Invariant {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        never_optimize_for: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            never_optimize_for: never_optimize_for.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Immutable catalogue of invariants, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Invariant>", into = "Vec<Invariant>")]
pub struct InvariantRegistry {
    invariants: Vec<Invariant>,
}

impl InvariantRegistry {
    /// Build a registry, rejecting empty or duplicate ids.
    pub fn new(invariants: Vec<Invariant>) -> CharterResult<Self> {
        let mut seen = BTreeSet::new();
        for invariant in &invariants {
            let id = invariant.id.trim();
            if id.is_empty() {
                return Err(CharterError::EmptyInvariantId);
            }
            if !seen.insert(id) {
                return Err(CharterError::DuplicateInvariant(id.to_string()));
            }
        }
        debug!(count = invariants.len(), "Invariant registry loaded");
        Ok(Self { invariants })
    }

    /// The catalogue shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            invariants: vec![
                Invariant::new(
                    "human_override",
                    "A human operator can always pause, halt or override an autonomous action",
                    &["override bypass", "operator exclusion"],
                ),
                Invariant::new(
                    "audit_trail",
                    "Every governed action is recorded in the append-only ledger before it takes effect",
                    &["unlogged execution", "audit suppression"],
                ),
                Invariant::new(
                    "pod_isolation",
                    "A pod acts only within its own scope unless a decision escalates it",
                    &["cross pod reach"],
                ),
                Invariant::new(
                    "consent",
                    "Actions touching an external party respect that party's recorded consent",
                    &["consent circumvention"],
                ),
                Invariant::new(
                    "reversibility",
                    "Reversible actions are preferred whenever an irreversible one is not required",
                    &["irreversible speed"],
                ),
                Invariant::new(
                    "data_minimization",
                    "Only the data an action needs is read, retained or shared",
                    &["data hoarding", "retention maximization"],
                ),
            ],
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.invariants.iter().map(|i| i.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Invariant> {
        self.invariants.iter().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invariant> {
        self.invariants.iter()
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<Invariant>> for InvariantRegistry {
    type Error = CharterError;

    fn try_from(invariants: Vec<Invariant>) -> Result<Self, Self::Error> {
        Self::new(invariants)
    }
}

impl From<InvariantRegistry> for Vec<Invariant> {
    fn from(registry: InvariantRegistry) -> Self {
        registry.invariants
    }
}
