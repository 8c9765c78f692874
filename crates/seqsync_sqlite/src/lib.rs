//! # seqsync SQLite backend
//!
//! A relational realization of the
//! [`SeqSynchronizer`](seqsync_core::SeqSynchronizer) contract over
//! SQLite, using `rusqlite` with an externally supplied `r2d2` connection
//! pool as the connection source.
//!
//! The backing table holds one row per (name, partition) key with a single
//! mutable `seq_next_value` column plus informational timestamps. Create is
//! an `INSERT OR IGNORE`, read is a point `SELECT`, and the compare-and-swap
//! is one conditional `UPDATE` whose WHERE clause matches the expected prior
//! value. The affected-row count decides the race, so no in-process
//! locking is needed and correctness holds across process boundaries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use r2d2_sqlite::SqliteConnectionManager;
//! use seqsync_core::SeqSynchronizer;
//! use seqsync_sqlite::SqliteSynchronizer;
//!
//! let pool = r2d2::Pool::new(SqliteConnectionManager::file("seq.db")).unwrap();
//! let mut seq = SqliteSynchronizer::new(pool, "seq_registry");
//! seq.init().unwrap();
//!
//! seq.try_create("orders", "2024-01", 1000).unwrap();
//! let state = seq.try_add_and_get("orders", "2024-01", 50, 3).unwrap();
//! if state.is_success() {
//!     // values [previous, current) are ours to dispense
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod synchronizer;

pub use synchronizer::SqliteSynchronizer;
