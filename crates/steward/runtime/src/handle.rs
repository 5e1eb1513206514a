//! Single-writer handle over a ledger state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RuntimeError, RuntimeResult};

/// Shared, serialized access to one ledger state.
///
/// Ledger states are values, so the handle only has to swap the current
/// value under a write lock. Readers take an `Arc` snapshot and can keep
/// it for as long as they like while writers move on.
#[derive(Debug)]
pub struct LedgerHandle<S> {
    inner: Arc<RwLock<Arc<S>>>,
}

impl<S> Clone for LedgerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> LedgerHandle<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    /// The current state.
    pub fn snapshot(&self) -> RuntimeResult<Arc<S>> {
        Ok(Arc::clone(&*self.read()?))
    }

    /// Run `append` against the current state and install the state it
    /// returns. Appends are serialized; a failed append changes nothing.
    pub fn append<T, E>(&self, append: impl FnOnce(&S) -> Result<(S, T), E>) -> RuntimeResult<T>
    where
        RuntimeError: From<E>,
    {
        let mut guard = self.write()?;
        let (next, value) = append(&guard)?;
        *guard = Arc::new(next);
        Ok(value)
    }

    /// Replace the state outright, as when restoring from storage.
    pub fn replace(&self, state: S) -> RuntimeResult<()> {
        *self.write()? = Arc::new(state);
        Ok(())
    }

    pub(crate) fn read(&self) -> RuntimeResult<RwLockReadGuard<'_, Arc<S>>> {
        self.inner
            .read()
            .map_err(|_| RuntimeError::Poisoned("ledger read"))
    }

    pub(crate) fn write(&self) -> RuntimeResult<RwLockWriteGuard<'_, Arc<S>>> {
        self.inner
            .write()
            .map_err(|_| RuntimeError::Poisoned("ledger write"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use steward_governance::{create_state, GovernanceError, GovernanceState};

    #[test]
    fn snapshot_survives_later_appends() {
        let handle = LedgerHandle::new(create_state(None));
        let before = handle.snapshot().unwrap();
        let token = handle.append(steward_governance::advance_clock).unwrap();
        assert_eq!(token.to_string(), "g1");
        assert_eq!(before.logical_clock().value(), 0);
        assert_eq!(handle.snapshot().unwrap().logical_clock().value(), 1);
    }

    #[test]
    fn failed_append_changes_nothing() {
        let handle = LedgerHandle::new(create_state(None));
        let result: RuntimeResult<()> =
            handle.append(|_: &GovernanceState| Err(GovernanceError::MissingPodId));
        assert!(result.is_err());
        assert_eq!(handle.snapshot().unwrap().logical_clock().value(), 0);
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        let handle = LedgerHandle::new(create_state(None));
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        handle.append(steward_governance::advance_clock).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(handle.snapshot().unwrap().logical_clock().value(), 200);
    }
}
