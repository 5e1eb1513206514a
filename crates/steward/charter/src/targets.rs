//! Forbidden optimization-target matching.
//!
//! Phrases are normalized (lower-cased, punctuation replaced by spaces,
//! whitespace collapsed) and a declared target hits when its words contain
//! a forbidden phrase's words as a contiguous run. Matching is on whole
//! words, so "costs" does not hit "cost", and a fragment of a phrase such
//! as "speed" or "consent" is not itself forbidden. This is plain text
//! normalization; richer matchers plug in through [`TargetMatcher`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constitution::Constitution;
use crate::invariant::InvariantRegistry;

/// A declared target that matched a forbidden phrase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHit {
    /// The target as the caller declared it.
    pub target: String,
    /// The normalized forbidden phrase it matched.
    pub forbidden: String,
}

/// Decides which declared optimization targets are forbidden.
pub trait TargetMatcher: Send + Sync + std::fmt::Debug {
    /// Every declared target that hits the denylist, in declaration order.
    fn forbidden_hits(&self, declared: &[String]) -> Vec<TargetHit>;
}

/// Normalize a phrase for denylist comparison.
pub fn normalize_target(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The combined, normalized denylist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForbiddenTargets {
    phrases: BTreeSet<String>,
}

impl ForbiddenTargets {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| normalize_target(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// Constitution non-goals plus every invariant's `never_optimize_for`.
    pub fn from_charter(registry: &InvariantRegistry, constitution: &Constitution) -> Self {
        let from_invariants = registry
            .iter()
            .flat_map(|i| i.never_optimize_for.iter().map(String::as_str));
        let from_constitution = constitution.non_goals().iter().map(String::as_str);
        let targets = Self::new(from_constitution.chain(from_invariants));
        debug!(phrases = targets.len(), "Forbidden target set built");
        targets
    }

    /// Whether `phrase` (after normalization) is itself on the denylist.
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(&normalize_target(phrase))
    }

    /// The first forbidden phrase `target` matches, if any.
    pub fn find_match(&self, target: &str) -> Option<&str> {
        let normalized = normalize_target(target);
        if normalized.is_empty() {
            return None;
        }
        if let Some(exact) = self.phrases.get(&normalized) {
            return Some(exact.as_str());
        }
        let words: Vec<&str> = normalized.split(' ').collect();
        self.phrases
            .iter()
            .find(|phrase| contains_run(&words, phrase))
            .map(String::as_str)
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Whether the normalized `phrase` occurs as consecutive whole words.
fn contains_run(words: &[&str], phrase: &str) -> bool {
    let run: Vec<&str> = phrase.split(' ').collect();
    run.len() <= words.len() && words.windows(run.len()).any(|window| window == run.as_slice())
}

impl TargetMatcher for ForbiddenTargets {
    fn forbidden_hits(&self, declared: &[String]) -> Vec<TargetHit> {
        declared
            .iter()
            .filter_map(|target| {
                self.find_match(target).map(|forbidden| TargetHit {
                    target: target.clone(),
                    forbidden: forbidden.to_string(),
                })
            })
            .collect()
    }
}
