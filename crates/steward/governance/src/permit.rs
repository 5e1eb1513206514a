use tracing::debug;

use crate::types::{
    ExecutionContext, ExecutionPermit, GovernanceDecision, GovernanceScope, Initiator, PermitReason,
};

/// Decide whether `decision` may be executed in `context`.
///
/// Wider-than-pod decisions need a granted approval and a human executor, in
/// that order of precedence. Local decisions bound to a pod may only be
/// executed from that pod.
pub fn can_execute_decision(
    decision: &GovernanceDecision,
    context: &ExecutionContext,
) -> ExecutionPermit {
    let permit = match decision.scope() {
        GovernanceScope::CrossPod | GovernanceScope::System => {
            if context.approval_granted != Some(true) {
                ExecutionPermit::deny(PermitReason::HumanApprovalRequired)
            } else if context.initiator != Some(Initiator::Human) {
                ExecutionPermit::deny(PermitReason::HumanExecutorRequired)
            } else {
                ExecutionPermit::allow(PermitReason::HumanApproved)
            }
        }
        GovernanceScope::LocalPod => match decision.pod_id() {
            Some(pod) if context.pod_id.as_deref() != Some(pod) => {
                ExecutionPermit::deny(PermitReason::PodScopeMismatch)
            }
            _ => ExecutionPermit::allow(PermitReason::LocalPodScope),
        },
    };
    debug!(
        governance_id = %decision.governance_id(),
        ok = permit.ok,
        reason = %permit.reason,
        "Execution permit evaluated"
    );
    permit
}
