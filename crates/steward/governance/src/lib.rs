//! # steward-governance
//!
//! The governance ledger: an append-only, logically-clocked log of decisions
//! about what autonomous or human-initiated actions count as governed.
//!
//! ## Core Components
//!
//! - **GovernanceLedger**: validates a [`GovernanceDecisionInput`] against
//!   the charter and appends it to a [`GovernanceState`]
//! - **can_execute_decision**: runtime permit check for a recorded decision
//! - **detect_conflicts / evaluate_state**: whole-history classification
//!   into CLEAR or SAFE_HOLD
//! - **get_ledger**: the chronological read view
//!
//! States are values. Every append returns a new state and leaves the old
//! one intact; hosts that share a ledger across threads serialize appends
//! themselves.

#![deny(unsafe_code)]

pub mod conflicts;
pub mod error;
pub mod ledger;
pub mod permit;
pub mod state;
pub mod types;

pub use conflicts::{detect_conflicts, evaluate_state};
pub use error::{GovernanceError, GovernanceResult};
pub use ledger::GovernanceLedger;
pub use permit::can_execute_decision;
pub use state::{advance_clock, create_state, get_ledger, GovernanceSeed, GovernanceState};
pub use types::{
    ConflictReason, ExecutionContext, ExecutionPermit, GovernanceConflict, GovernanceDecision,
    GovernanceDecisionInput, GovernanceEvaluation, GovernanceMode, GovernanceScope, Initiator,
    PermitReason,
};
