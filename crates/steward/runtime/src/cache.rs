//! Memoized governance evaluation.

use std::sync::{Arc, Mutex};

use steward_governance::{evaluate_state, GovernanceEvaluation, GovernanceState};
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Default)]
struct Slot {
    entry: Option<(Arc<GovernanceState>, Arc<GovernanceEvaluation>)>,
    hits: u64,
    misses: u64,
}

/// Remembers the evaluation of the most recent state snapshot.
///
/// A hit requires the very same `Arc` the evaluation was computed from.
/// Every append or restore through a [`LedgerHandle`](crate::LedgerHandle)
/// installs a fresh `Arc`, so a replaced history can never be answered
/// from the cache. The slot holds its `Arc`, which keeps the pointer from
/// being reused while cached.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    slot: Mutex<Slot>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(
        &self,
        state: &Arc<GovernanceState>,
    ) -> RuntimeResult<Arc<GovernanceEvaluation>> {
        let mut slot = self.lock()?;
        let cached = slot
            .entry
            .as_ref()
            .filter(|(cached_state, _)| Arc::ptr_eq(cached_state, state))
            .map(|(_, evaluation)| Arc::clone(evaluation));
        if let Some(evaluation) = cached {
            slot.hits += 1;
            return Ok(evaluation);
        }

        debug!(
            len = state.len(),
            clock = state.logical_clock().value(),
            "Evaluating governance state"
        );
        let evaluation = Arc::new(evaluate_state(state.decisions()));
        slot.entry = Some((Arc::clone(state), Arc::clone(&evaluation)));
        slot.misses += 1;
        Ok(evaluation)
    }

    /// Drop the cached evaluation. Stats are kept.
    pub fn clear(&self) -> RuntimeResult<()> {
        self.lock()?.entry = None;
        Ok(())
    }

    /// `(hits, misses)` so far.
    pub fn stats(&self) -> RuntimeResult<(u64, u64)> {
        let slot = self.lock()?;
        Ok((slot.hits, slot.misses))
    }

    fn lock(&self) -> RuntimeResult<std::sync::MutexGuard<'_, Slot>> {
        self.slot
            .lock()
            .map_err(|_| RuntimeError::Poisoned("evaluation cache"))
    }
}
