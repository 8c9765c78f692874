//! In-memory synchronizer for testing and ephemeral use.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{SeqError, SeqResult};
use crate::record::SequenceRecord;
use crate::state::AddState;
use crate::stats::SyncStats;
use crate::synchronizer::SeqSynchronizer;

/// An in-memory synchronizer backed by a shared map.
///
/// Realizes the contract with a native compare-and-swap under a write
/// lock. Suitable for:
/// - Unit and integration tests of contract consumers
/// - Ephemeral sequences that do not need to survive the process
///
/// The add loop composes the same read and CAS primitives the relational
/// backend uses rather than mutating under one lock hold, so retry
/// accounting and counter totals match the contract exactly.
///
/// # Example
///
/// ```rust
/// use seqsync_core::{InMemorySynchronizer, SeqSynchronizer};
///
/// let seq = InMemorySynchronizer::new();
/// assert!(seq.try_create("orders", "2024-01", 1000).unwrap());
/// let state = seq.try_add_and_get("orders", "2024-01", 5, -1).unwrap();
/// assert_eq!(state.current(), 1005);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySynchronizer {
    entries: RwLock<HashMap<(String, String), SequenceRecord>>,
    stats: SyncStats,
}

impl InMemorySynchronizer {
    /// Creates a new empty synchronizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record for the given key, if present.
    ///
    /// Useful for inspecting timestamps in tests.
    #[must_use]
    pub fn record(&self, name: &str, partition: &str) -> Option<SequenceRecord> {
        self.entries
            .read()
            .get(&(name.to_owned(), partition.to_owned()))
            .cloned()
    }

    fn read_value(&self, name: &str, partition: &str) -> Option<i64> {
        self.stats.record_query();
        self.entries
            .read()
            .get(&(name.to_owned(), partition.to_owned()))
            .map(|record| record.next_value)
    }

    fn compare_and_set(&self, name: &str, partition: &str, old: i64, new: i64) -> bool {
        self.stats.record_update();
        let mut entries = self.entries.write();
        match entries.get_mut(&(name.to_owned(), partition.to_owned())) {
            Some(record) if record.next_value == old => {
                record.next_value = new;
                record.updated_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }
}

impl SeqSynchronizer for InMemorySynchronizer {
    fn try_create(&self, name: &str, partition: &str, next_value: i64) -> SeqResult<bool> {
        self.stats.record_update();
        let mut entries = self.entries.write();
        let key = (name.to_owned(), partition.to_owned());
        if entries.contains_key(&key) {
            return Ok(false);
        }
        entries.insert(key, SequenceRecord::new(name, partition, next_value));
        Ok(true)
    }

    fn try_update(
        &self,
        name: &str,
        partition: &str,
        next_value_old: i64,
        next_value_new: i64,
    ) -> SeqResult<bool> {
        Ok(self.compare_and_set(name, partition, next_value_old, next_value_new))
    }

    fn try_add_and_get(
        &self,
        name: &str,
        partition: &str,
        delta: i64,
        max_retry: i32,
    ) -> SeqResult<AddState> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let last = self
                .read_value(name, partition)
                .ok_or_else(|| SeqError::not_found(name, partition))?;
            let target = last.wrapping_add(delta);
            if self.compare_and_set(name, partition, last, target) {
                return Ok(AddState::success(last, target, attempts));
            }
            if max_retry >= 0 && attempts >= max_retry as u32 + 1 {
                return Ok(AddState::failure(last, attempts));
            }
        }
    }

    fn next_value(&self, name: &str, partition: &str) -> SeqResult<Option<i64>> {
        Ok(self.read_value(name, partition))
    }

    fn init(&mut self) -> SeqResult<()> {
        // Nothing to provision
        Ok(())
    }

    fn query_count(&self) -> u64 {
        self.stats.queries()
    }

    fn update_count(&self) -> u64 {
        self.stats.updates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn create_is_first_writer_wins() {
        let seq = InMemorySynchronizer::new();
        assert!(seq.try_create("orders", "2024-01", 1000).unwrap());
        assert!(!seq.try_create("orders", "2024-01", 9999).unwrap());
        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(1000));
    }

    #[test]
    fn keys_are_independent() {
        let seq = InMemorySynchronizer::new();
        seq.try_create("orders", "2024-01", 1).unwrap();
        seq.try_create("orders", "2024-02", 100).unwrap();
        seq.try_create("invoices", "2024-01", 7).unwrap();

        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(1));
        assert_eq!(seq.next_value("orders", "2024-02").unwrap(), Some(100));
        assert_eq!(seq.next_value("invoices", "2024-01").unwrap(), Some(7));
    }

    #[test]
    fn cas_applies_only_on_matching_value() {
        let seq = InMemorySynchronizer::new();
        seq.try_create("orders", "2024-01", 5).unwrap();

        assert!(!seq.try_update("orders", "2024-01", 4, 10).unwrap());
        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(5));

        assert!(seq.try_update("orders", "2024-01", 5, 10).unwrap());
        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(10));

        let record = seq.record("orders", "2024-01").unwrap();
        assert_eq!(record.next_value, 10);
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn cas_on_missing_key_is_false() {
        let seq = InMemorySynchronizer::new();
        assert!(!seq.try_update("ghost", "p", 0, 1).unwrap());
    }

    #[test]
    fn add_advances_by_delta() {
        let seq = InMemorySynchronizer::new();
        seq.try_create("orders", "2024-01", 0).unwrap();

        for expected in 1..=10 {
            let state = seq.try_add_and_get("orders", "2024-01", 1, -1).unwrap();
            assert!(state.is_success());
            assert_eq!(state.delta(), 1);
            assert_eq!(state.current(), expected);
        }
        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(10));
    }

    #[test]
    fn add_on_missing_key_is_not_found() {
        let seq = InMemorySynchronizer::new();
        let err = seq.try_add_and_get("ghost", "p", 1, 0).unwrap_err();
        assert!(matches!(err, SeqError::NotFound { .. }));
    }

    #[test]
    fn uncontended_add_uses_one_attempt() {
        let seq = InMemorySynchronizer::new();
        seq.try_create("orders", "2024-01", 0).unwrap();
        let state = seq.try_add_and_get("orders", "2024-01", 3, 0).unwrap();
        assert!(state.is_success());
        assert_eq!(state.total_ops(), 1);
    }

    #[test]
    fn simple_scenario() {
        let seq = InMemorySynchronizer::new();
        assert!(seq.try_create("orders", "2024-01", 1000).unwrap());
        assert_eq!(seq.next_value("orders", "2024-01").unwrap(), Some(1000));

        assert!(!seq.try_update("orders", "2024-01", -1, 1).unwrap());
        assert!(seq.try_update("orders", "2024-01", 1000, 1).unwrap());

        let state = seq.try_add_and_get("orders", "2024-01", -1, 0).unwrap();
        assert!(state.is_success());
        assert_eq!(state.previous(), 1);
        assert_eq!(state.current(), 0);
        assert_eq!(state.total_ops(), 1);
    }

    #[test]
    fn counters_track_physical_operations() {
        let seq = InMemorySynchronizer::new();
        seq.try_create("orders", "2024-01", 0).unwrap();
        assert_eq!(seq.update_count(), 1);

        seq.next_value("orders", "2024-01").unwrap();
        assert_eq!(seq.query_count(), 1);

        // One read plus one accepted CAS
        seq.try_add_and_get("orders", "2024-01", 1, -1).unwrap();
        assert_eq!(seq.query_count(), 2);
        assert_eq!(seq.update_count(), 2);
    }

    #[test]
    fn concurrent_adds_lose_no_increments() {
        let seq = Arc::new(InMemorySynchronizer::new());
        seq.try_create("orders", "2024-01", 0).unwrap();

        let threads = 8;
        let adds_per_thread = 250;
        let mut handles = vec![];
        for _ in 0..threads {
            let seq = Arc::clone(&seq);
            handles.push(thread::spawn(move || {
                for _ in 0..adds_per_thread {
                    let state = seq.try_add_and_get("orders", "2024-01", 1, -1).unwrap();
                    assert!(state.is_success());
                    assert_eq!(state.delta(), 1);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(
            seq.next_value("orders", "2024-01").unwrap(),
            Some(i64::from(threads * adds_per_thread))
        );
    }

    #[test]
    fn bounded_retry_respects_budget_under_contention() {
        let seq = Arc::new(InMemorySynchronizer::new());
        seq.try_create("orders", "2024-01", 0).unwrap();

        let contender = {
            let seq = Arc::clone(&seq);
            thread::spawn(move || {
                for _ in 0..2000 {
                    seq.try_add_and_get("orders", "2024-01", 1, -1).unwrap();
                }
            })
        };

        for _ in 0..2000 {
            let state = seq.try_add_and_get("orders", "2024-01", 1, 2).unwrap();
            assert!(state.total_ops() <= 3);
            if !state.is_success() {
                // Failure reports the last-read value in both fields
                assert_eq!(state.previous(), state.current());
            }
        }
        contender.join().unwrap();
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn value_tracks_sum_of_applied_deltas(
                initial in -1000i64..1000,
                deltas in proptest::collection::vec(-50i64..50, 1..40),
            ) {
                let seq = InMemorySynchronizer::new();
                seq.try_create("seq", "p", initial).unwrap();

                let mut expected = initial;
                for delta in deltas {
                    let state = seq.try_add_and_get("seq", "p", delta, -1).unwrap();
                    prop_assert!(state.is_success());
                    prop_assert_eq!(state.delta(), delta);
                    expected = expected.wrapping_add(delta);
                    prop_assert_eq!(state.current(), expected);
                }
                prop_assert_eq!(seq.next_value("seq", "p").unwrap(), Some(expected));
            }
        }
    }
}
