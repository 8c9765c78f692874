//! Operational counters for synchronizer backends.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime tallies of physical store operations.
///
/// Counters are monotonically increasing and reset only by process restart.
/// They are a best-effort observability aid with no effect on correctness;
/// the atomic fetch-add is the only synchronization involved.
#[derive(Debug, Default)]
pub struct SyncStats {
    /// Total query statements issued to the store.
    queries: AtomicU64,
    /// Total update statements issued to the store.
    updates: AtomicU64,
}

impl SyncStats {
    /// Creates a new stats instance with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one physical query statement.
    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one physical update statement.
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of query statements issued.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the total number of update statements issued.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}
