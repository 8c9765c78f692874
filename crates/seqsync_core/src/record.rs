//! The durable state unit of a sequence.

use chrono::{DateTime, Utc};

/// One durable sequence entry, keyed by (name, partition).
///
/// `next_value` is the only mutable field and changes only through an
/// accepted conditional update. The timestamps are informational and play
/// no part in correctness. Records are never deleted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Caller-defined namespace, e.g. an application domain.
    pub name: String,
    /// Caller-defined sub-key, e.g. a date bucket or shard key.
    pub partition: String,
    /// The next value to be handed out.
    pub next_value: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When `next_value` was last replaced, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

impl SequenceRecord {
    /// Creates a fresh record with the given initial value, stamped now.
    #[must_use]
    pub fn new(name: impl Into<String>, partition: impl Into<String>, next_value: i64) -> Self {
        Self {
            name: name.into(),
            partition: partition.into(),
            next_value,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}
