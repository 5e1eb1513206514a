//! Canonical chronological read view over ledger entries.

use crate::time::LogicalTime;

/// Anything appended to a ledger carries the logical time it was created at.
pub trait Timestamped {
    fn created_at(&self) -> LogicalTime;
}

/// Return `entries` sorted ascending by logical time.
///
/// The sort is stable, so entries sharing a timestamp keep their insertion
/// order. Sorting an already-sorted view yields the same sequence.
pub fn chronological<T: Timestamped + Clone>(entries: &[T]) -> Vec<T> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.created_at());
    sorted
}

/// Whether `entries` are already in ascending logical-time order.
pub fn is_chronological<T: Timestamped>(entries: &[T]) -> bool {
    entries
        .windows(2)
        .all(|pair| pair[0].created_at() <= pair[1].created_at())
}
