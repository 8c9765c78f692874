//! Outcome of an add-with-retry operation.

/// The immutable outcome of one
/// [`try_add_and_get`](crate::SeqSynchronizer::try_add_and_get) call.
///
/// Constructed fresh by each call and returned to the caller; the core
/// retains no reference to it. Retry exhaustion is reported here as
/// `success == false`, not as an error, so callers must check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddState {
    previous: i64,
    current: i64,
    success: bool,
    total_ops: u32,
}

impl AddState {
    /// Creates the outcome of an accepted add.
    ///
    /// `previous` is the value observed immediately before the accepted
    /// conditional update, `current` the value it installed.
    #[must_use]
    pub fn success(previous: i64, current: i64, total_ops: u32) -> Self {
        Self {
            previous,
            current,
            success: true,
            total_ops,
        }
    }

    /// Creates the outcome of an add whose retry budget was exhausted.
    ///
    /// No state was changed. Both `previous` and `current` report
    /// `last_seen`, the value observed by the final read; the outcome
    /// never fabricates a delta it did not apply.
    #[must_use]
    pub fn failure(last_seen: i64, total_ops: u32) -> Self {
        Self {
            previous: last_seen,
            current: last_seen,
            success: false,
            total_ops,
        }
    }

    /// The value observed before the accepted update.
    #[must_use]
    pub fn previous(&self) -> i64 {
        self.previous
    }

    /// The value installed by the accepted update.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Whether some attempt within the retry budget was accepted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The number of read-then-CAS attempts actually performed.
    ///
    /// At least 1 on any invocation that reached the store.
    #[must_use]
    pub fn total_ops(&self) -> u32 {
        self.total_ops
    }

    /// The applied delta: `current - previous`. Zero on failure.
    #[must_use]
    pub fn delta(&self) -> i64 {
        self.current.wrapping_sub(self.previous)
    }
}
