//! Error types for sequence synchronization.

use thiserror::Error;

/// Result type for synchronizer operations.
pub type SeqResult<T> = Result<T, SeqError>;

/// Errors that can occur during synchronizer operations.
///
/// Logical outcomes (a missing row on read, a lost CAS race, an exhausted
/// retry budget) are returned as data: `Ok(None)`, `Ok(false)`, or an
/// [`AddState`](crate::AddState) with `success == false`. They are never
/// raised as errors.
/// `SeqError` is reserved for failures to communicate with or faithfully
/// interpret the durable store.
#[derive(Debug, Error)]
pub enum SeqError {
    /// A statement could not be executed against the durable store.
    ///
    /// Covers connectivity loss, pool exhaustion, malformed statements, and
    /// constraint violations other than the expected duplicate key on
    /// create. Never retried by the core.
    #[error("store fault: {0}")]
    Store(String),

    /// The stored state is present but semantically invalid, e.g. a NULL
    /// where a value is mandatory.
    #[error("corrupt sequence state: {0}")]
    CorruptState(String),

    /// The sequence does not exist.
    ///
    /// Raised only by the read inside the add loop, which requires the key
    /// to have been created first; plain reads report absence as `Ok(None)`.
    #[error("sequence not found: {name}/{partition}")]
    NotFound {
        /// The sequence name.
        name: String,
        /// The sequence partition.
        partition: String,
    },
}

impl SeqError {
    /// Creates a store fault.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a corrupt-state fault.
    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::CorruptState(message.into())
    }

    /// Creates a not-found error for the given key.
    pub fn not_found(name: impl Into<String>, partition: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            partition: partition.into(),
        }
    }
}
