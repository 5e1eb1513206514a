//! Drift score: a [0,1] health signal, higher is healthier.
//!
//! Each count subtracts a fixed weight from a perfect score of 1.0 and the
//! result is clamped, so the score is non-increasing in every input and
//! strictly decreasing until it bottoms out at zero.

use serde::{Deserialize, Serialize};

/// Counts of governance gaps observed over some window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftInputs {
    pub invariant_violations: u32,
    pub prohibited_target_hits: u32,
    pub missing_intent: u32,
    pub missing_approval: u32,
}

impl DriftInputs {
    /// Component-wise sum of two tallies.
    pub fn merge(self, other: Self) -> Self {
        Self {
            invariant_violations: self
                .invariant_violations
                .saturating_add(other.invariant_violations),
            prohibited_target_hits: self
                .prohibited_target_hits
                .saturating_add(other.prohibited_target_hits),
            missing_intent: self.missing_intent.saturating_add(other.missing_intent),
            missing_approval: self.missing_approval.saturating_add(other.missing_approval),
        }
    }

    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Penalty subtracted per occurrence of each gap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftWeights {
    pub invariant_violation: f64,
    pub prohibited_target_hit: f64,
    pub missing_intent: f64,
    pub missing_approval: f64,
}

impl Default for DriftWeights {
    fn default() -> Self {
        Self {
            invariant_violation: 0.25,
            prohibited_target_hit: 0.2,
            missing_intent: 0.1,
            missing_approval: 0.15,
        }
    }
}

/// Score `inputs` with the default weights.
pub fn drift_score(inputs: &DriftInputs) -> f64 {
    score_with(inputs, &DriftWeights::default())
}

/// Score `inputs` with caller-supplied weights.
///
/// Negative or non-finite weights are treated as zero so a misconfigured
/// weight can never make the score rise with more violations.
pub fn score_with(inputs: &DriftInputs, weights: &DriftWeights) -> f64 {
    let weight = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let penalty = weight(weights.invariant_violation) * f64::from(inputs.invariant_violations)
        + weight(weights.prohibited_target_hit) * f64::from(inputs.prohibited_target_hits)
        + weight(weights.missing_intent) * f64::from(inputs.missing_intent)
        + weight(weights.missing_approval) * f64::from(inputs.missing_approval);
    (1.0 - penalty).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_inputs_score_one() {
        assert_eq!(drift_score(&DriftInputs::default()), 1.0);
        assert!(DriftInputs::default().is_clean());
    }

    #[test]
    fn single_violation_costs_its_weight() {
        let inputs = DriftInputs {
            invariant_violations: 1,
            ..Default::default()
        };
        assert!((drift_score(&inputs) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn clamps_at_zero() {
        let inputs = DriftInputs {
            invariant_violations: 100,
            prohibited_target_hits: 100,
            missing_intent: 100,
            missing_approval: 100,
        };
        assert_eq!(drift_score(&inputs), 0.0);
    }

    #[test]
    fn bad_weights_are_ignored() {
        let weights = DriftWeights {
            invariant_violation: -1.0,
            prohibited_target_hit: f64::NAN,
            missing_intent: 0.1,
            missing_approval: 0.1,
        };
        let inputs = DriftInputs {
            invariant_violations: 3,
            prohibited_target_hits: 3,
            ..Default::default()
        };
        assert_eq!(score_with(&inputs, &weights), 1.0);
    }

    #[test]
    fn merge_adds_componentwise() {
        let a = DriftInputs {
            invariant_violations: 1,
            missing_intent: 2,
            ..Default::default()
        };
        let b = DriftInputs {
            invariant_violations: 1,
            missing_approval: 4,
            ..Default::default()
        };
        let merged = a.merge(b);
        assert_eq!(merged.invariant_violations, 2);
        assert_eq!(merged.missing_intent, 2);
        assert_eq!(merged.missing_approval, 4);
    }

    fn arb_inputs() -> impl Strategy<Value = DriftInputs> {
        (0u32..20, 0u32..20, 0u32..20, 0u32..20).prop_map(|(a, b, c, d)| DriftInputs {
            invariant_violations: a,
            prohibited_target_hits: b,
            missing_intent: c,
            missing_approval: d,
        })
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_interval(inputs in arb_inputs()) {
            let score = drift_score(&inputs);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn more_gaps_never_raise_the_score(inputs in arb_inputs(), which in 0usize..4) {
            let mut worse = inputs;
            match which {
                0 => worse.invariant_violations += 1,
                1 => worse.prohibited_target_hits += 1,
                2 => worse.missing_intent += 1,
                _ => worse.missing_approval += 1,
            }
            prop_assert!(drift_score(&worse) <= drift_score(&inputs));
        }
    }
}
