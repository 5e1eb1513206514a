//! # steward-execution
//!
//! The irreversibility map and the execution ledger.
//!
//! Before an action with real-world consequences runs, the caller submits an
//! [`ExecutionDecisionInput`]. The evaluator works out the impact the action
//! actually requires, derives the release gate from scope × impact, and
//! either allows the action or holds it with every unmet requirement listed.
//! Allowed actions are then recorded in an append-only, logically-clocked
//! [`ExecutionLedgerState`].
//!
//! ## Core Components
//!
//! - **IrreversibilityCatalogue**: known points of no return and the impact
//!   each implies
//! - **ActionImpactMap**: action key → minimum impact, seeded from the
//!   catalogue
//! - **get_release_gate**: the scope × impact gate table
//! - **ExecutionPolicy**: action map, target matcher, per-gate cooling-off
//!   defaults and drift threshold
//! - **evaluate_execution_decision**: ALLOW / SAFE_HOLD with reasons
//! - **append_execution_record**: validated append to the ledger
//! - **tally_drift**: drift inputs from a batch of evaluations

#![deny(unsafe_code)]

pub mod catalogue;
pub mod drift;
pub mod error;
pub mod evaluate;
pub mod impact_map;
pub mod ledger;
pub mod policy;
pub mod types;

pub use catalogue::{IrreversibilityCatalogue, IrreversibilityPoint};
pub use drift::{score_evaluations, tally_drift};
pub use error::{ExecutionError, ExecutionResult};
pub use evaluate::{
    evaluate_execution_decision, ExecutionDecisionInput, ExecutionEvaluation, ExecutionStatus,
    HoldReason,
};
pub use impact_map::{get_required_impact, ActionImpactMap};
pub use ledger::{
    advance_execution_clock, append_execution_record, create_execution_ledger_state,
    get_execution_ledger, ExecutionLedgerRecord, ExecutionLedgerState, ExecutionRecordInput,
    ExecutionSeed,
};
pub use policy::ExecutionPolicy;
pub use types::{
    get_release_gate, ActionImpact, IrreversibilityApproval, IrreversibilityFallback,
    IrreversibilityReversibility, IrreversibilityScope, ReleaseGate,
};
