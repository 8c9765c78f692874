//! # seqsync core
//!
//! Contract and data model for named, partitioned, durable sequences.
//!
//! A sequence is a monotonically-advancing counter identified by the pair
//! (name, partition), shared safely by any number of concurrent callers
//! (threads, processes, or service instances) with no external locking.
//! The sole correctness primitive is the backing store's atomic single-key
//! conditional update.
//!
//! ## Design Principles
//!
//! - Backends implement the [`SeqSynchronizer`] trait; callers depend only
//!   on the contract
//! - Logical outcomes (absence, a lost CAS race, an exhausted retry budget)
//!   are data, never errors
//! - Faults ([`SeqError`]) are reserved for failures to talk to or
//!   faithfully interpret the durable store
//!
//! ## Available Backends
//!
//! - [`InMemorySynchronizer`] - native CAS over a shared map, for testing
//!   and ephemeral use
//! - `SqliteSynchronizer` (in the `seqsync_sqlite` crate) - conditional SQL
//!   over a relational store
//!
//! ## Example
//!
//! ```rust
//! use seqsync_core::{InMemorySynchronizer, SeqSynchronizer};
//!
//! let seq = InMemorySynchronizer::new();
//! assert!(seq.try_create("orders", "2024-01", 1000).unwrap());
//! assert!(seq.try_update("orders", "2024-01", 1000, 1).unwrap());
//! let state = seq.try_add_and_get("orders", "2024-01", -1, 0).unwrap();
//! assert_eq!((state.previous(), state.current()), (1, 0));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod record;
mod state;
mod stats;
mod synchronizer;

pub use error::{SeqError, SeqResult};
pub use memory::InMemorySynchronizer;
pub use record::SequenceRecord;
pub use state::AddState;
pub use stats::SyncStats;
pub use synchronizer::SeqSynchronizer;
