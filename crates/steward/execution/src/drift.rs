//! Drift tallies over batches of execution evaluations.

use steward_charter::{drift_score, DriftInputs};

use crate::evaluate::{ExecutionEvaluation, HoldReason};

/// Count the governance gaps a batch of evaluations surfaced.
///
/// Invariant and constitution failures both count as invariant violations;
/// every forbidden target hit counts once.
pub fn tally_drift<'a, I>(evaluations: I) -> DriftInputs
where
    I: IntoIterator<Item = &'a ExecutionEvaluation>,
{
    evaluations
        .into_iter()
        .fold(DriftInputs::default(), |tally, evaluation| {
            let mut step = DriftInputs {
                prohibited_target_hits: u32::try_from(evaluation.forbidden_hits.len())
                    .unwrap_or(u32::MAX),
                ..DriftInputs::default()
            };
            for reason in &evaluation.reasons {
                match reason {
                    HoldReason::InvariantsFailed | HoldReason::ConstitutionFailed => {
                        step.invariant_violations += 1
                    }
                    HoldReason::MissingIntent => step.missing_intent += 1,
                    HoldReason::HumanApprovalRequired => step.missing_approval += 1,
                    HoldReason::ImpactUnderstated
                    | HoldReason::TimeDelayPending
                    | HoldReason::DriftScoreMissing
                    | HoldReason::DriftBelowThreshold
                    | HoldReason::ForbiddenTarget
                    | HoldReason::ShadowOnlyGate => {}
                }
            }
            tally.merge(step)
        })
}

/// [`tally_drift`] scored with the default weights.
pub fn score_evaluations<'a, I>(evaluations: I) -> f64
where
    I: IntoIterator<Item = &'a ExecutionEvaluation>,
{
    drift_score(&tally_drift(evaluations))
}
