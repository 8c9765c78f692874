//! Synchronizer contract definition.

use crate::error::SeqResult;
use crate::state::AddState;

/// A durable, race-free counter synchronizer.
///
/// A synchronizer manages named, partitioned sequences: monotonic counters
/// identified by the pair (name, partition), shared across threads,
/// processes, or service instances. All coordination correctness rests on
/// the backing store's atomic single-key conditional update; the contract
/// requires no caller-side locking.
///
/// # Invariants
///
/// - Creation is first-writer-wins: at most one of any set of concurrent
///   [`try_create`](Self::try_create) racers returns `true`, and later
///   callers observe the first writer's initial value.
/// - `next_value` changes only through an accepted conditional update
///   matching the reader's last-observed value.
/// - Every operation except [`init`](Self::init) is safe for unbounded
///   concurrent invocation. `init` must be externally serialized and is
///   intended to run once at startup.
///
/// # Implementors
///
/// - [`super::InMemorySynchronizer`] - native CAS over a shared map, for
///   testing and ephemeral use
/// - `SqliteSynchronizer` (in `seqsync_sqlite`) - conditional SQL over a
///   relational store
pub trait SeqSynchronizer: Send + Sync {
    /// Inserts a new sequence if the key does not exist.
    ///
    /// Returns `Ok(true)` iff this call caused the insert. `Ok(false)`
    /// means the key already existed, regardless of its stored value, and
    /// is not an error; the proposed `next_value` did not take effect.
    /// Safe to call repeatedly and concurrently to "ensure" existence.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store-level fault.
    fn try_create(&self, name: &str, partition: &str, next_value: i64) -> SeqResult<bool>;

    /// Compare-and-swap: replaces the stored value with `next_value_new`
    /// iff it currently equals `next_value_old`.
    ///
    /// Returns `Ok(false)` when the key is missing or the compare value is
    /// stale (a lost race). This is the sole mutation primitive; every
    /// other mutating operation is built from it.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store-level fault.
    fn try_update(
        &self,
        name: &str,
        partition: &str,
        next_value_old: i64,
        next_value_new: i64,
    ) -> SeqResult<bool>;

    /// Atomically adds `delta` to the stored value via a read-then-CAS
    /// loop, re-reading on every attempt.
    ///
    /// `max_retry < 0` retries indefinitely; `max_retry = R >= 0` performs
    /// at most `R + 1` total attempts, so `max_retry = 0` performs exactly
    /// one. Exhausting the budget is a normal outcome reported through
    /// [`AddState`], not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SeqError::NotFound`](crate::SeqError::NotFound) when the
    /// sequence has not been created, or a store-level fault.
    fn try_add_and_get(
        &self,
        name: &str,
        partition: &str,
        delta: i64,
        max_retry: i32,
    ) -> SeqResult<AddState>;

    /// Returns the current stored value, or `None` if the key does not
    /// exist. Never mutates state.
    ///
    /// # Errors
    ///
    /// Returns an error on a store-level fault, or when the stored state
    /// is present but corrupt.
    fn next_value(&self, name: &str, partition: &str) -> SeqResult<Option<i64>>;

    /// Performs idempotent setup, e.g. schema provisioning.
    ///
    /// Not safe for concurrent invocation; the `&mut` receiver encodes
    /// that. Safe to invoke multiple times sequentially; in practice it is
    /// called once at startup before the synchronizer is shared.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store-level fault.
    fn init(&mut self) -> SeqResult<()>;

    /// Total query statements issued to the store over the process
    /// lifetime. Backends that do not track this return 0.
    fn query_count(&self) -> u64 {
        0
    }

    /// Total update statements issued to the store over the process
    /// lifetime. Backends that do not track this return 0.
    fn update_count(&self) -> u64 {
        0
    }
}
