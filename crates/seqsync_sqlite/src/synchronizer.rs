//! SQLite-backed sequence synchronizer.

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use seqsync_core::{AddState, SeqError, SeqResult, SeqSynchronizer, SyncStats};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS $TABLE (\
     seq_name VARCHAR(32) NOT NULL, \
     seq_partition VARCHAR(255) NOT NULL, \
     seq_next_value BIGINT NOT NULL, \
     seq_create_time TIMESTAMP NOT NULL, \
     seq_update_time TIMESTAMP NULL, \
     PRIMARY KEY (seq_name, seq_partition))";

const DROP_TABLE: &str = "DROP TABLE IF EXISTS $TABLE";

const INSERT_IGNORE: &str = "INSERT OR IGNORE INTO $TABLE \
     (seq_name, seq_partition, seq_next_value, seq_create_time, seq_update_time) \
     VALUES (?1, ?2, ?3, ?4, NULL)";

const UPDATE_VALUE: &str = "UPDATE $TABLE SET seq_next_value = ?1, seq_update_time = ?2 \
     WHERE seq_name = ?3 AND seq_partition = ?4 AND seq_next_value = ?5";

const SELECT_VALUE: &str =
    "SELECT seq_next_value FROM $TABLE WHERE seq_name = ?1 AND seq_partition = ?2";

/// A sequence synchronizer over a SQLite table.
///
/// One instance is bound to one table and one externally supplied
/// connection pool; the pool is the contract's "connection source" and is
/// borrowed per operation, never retained across calls. The entire
/// compare-and-swap is pushed into a single conditional `UPDATE`, so the
/// store's row-level atomicity for one statement is the sole correctness
/// primitive; no in-process locking is involved.
///
/// Concurrent writers on separate pool connections may see the store's
/// native busy signalling; configure the pool's connections with a busy
/// timeout (and typically WAL journaling) when multiple writers share a
/// database file.
///
/// # Example
///
/// ```rust,no_run
/// use r2d2_sqlite::SqliteConnectionManager;
/// use seqsync_core::SeqSynchronizer;
/// use seqsync_sqlite::SqliteSynchronizer;
///
/// let manager = SqliteConnectionManager::file("seq.db");
/// let pool = r2d2::Pool::new(manager).unwrap();
/// let mut seq = SqliteSynchronizer::new(pool, "seq_registry");
/// seq.init().unwrap();
/// seq.try_create("orders", "2024-01", 1000).unwrap();
/// ```
#[derive(Debug)]
pub struct SqliteSynchronizer {
    table: String,
    pool: Pool<SqliteConnectionManager>,
    stats: SyncStats,
}

impl SqliteSynchronizer {
    /// Creates a synchronizer bound to `table` on the given pool.
    ///
    /// The table is not provisioned here; call
    /// [`init`](SeqSynchronizer::init) once at startup.
    #[must_use]
    pub fn new(pool: Pool<SqliteConnectionManager>, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            pool,
            stats: SyncStats::new(),
        }
    }

    /// The table this synchronizer operates on.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates the backing table if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a store fault if the DDL cannot be executed.
    pub fn create_table(&self) -> SeqResult<()> {
        info!(table = %self.table, "create table if not exists");
        let conn = self.acquire()?;
        let sql = self.sql(CREATE_TABLE);
        conn.execute(&sql, []).map_err(store_fault)?;
        Ok(())
    }

    /// Drops the backing table if it exists.
    ///
    /// Administrative helper; the synchronizer itself never deletes
    /// records.
    ///
    /// # Errors
    ///
    /// Returns a store fault if the DDL cannot be executed.
    pub fn drop_table(&self) -> SeqResult<()> {
        warn!(table = %self.table, "drop table if exists");
        let conn = self.acquire()?;
        let sql = self.sql(DROP_TABLE);
        conn.execute(&sql, []).map_err(store_fault)?;
        Ok(())
    }

    fn sql(&self, template: &str) -> String {
        template.replace("$TABLE", &self.table)
    }

    fn acquire(&self) -> SeqResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(store_fault)
    }

    fn select_on(&self, conn: &Connection, name: &str, partition: &str) -> SeqResult<Option<i64>> {
        let sql = self.sql(SELECT_VALUE);
        debug!(%name, %partition, "select next value");
        self.stats.record_query();
        let row: Option<Option<i64>> = conn
            .query_row(&sql, params![name, partition], |row| row.get(0))
            .optional()
            .map_err(store_fault)?;
        match row {
            None => Ok(None),
            Some(None) => Err(SeqError::corrupt_state(format!(
                "NULL next_value for {name}/{partition}"
            ))),
            Some(Some(value)) => Ok(Some(value)),
        }
    }

    fn insert_on(
        &self,
        conn: &Connection,
        name: &str,
        partition: &str,
        next_value: i64,
    ) -> SeqResult<bool> {
        let sql = self.sql(INSERT_IGNORE);
        debug!(%name, %partition, next_value, "insert if absent");
        self.stats.record_update();
        let rows = conn
            .execute(&sql, params![name, partition, next_value, Utc::now()])
            .map_err(store_fault)?;
        Ok(rows > 0)
    }

    fn update_on(
        &self,
        conn: &Connection,
        name: &str,
        partition: &str,
        old: i64,
        new: i64,
    ) -> SeqResult<bool> {
        let sql = self.sql(UPDATE_VALUE);
        debug!(%name, %partition, old, new, "conditional update");
        self.stats.record_update();
        let rows = conn
            .execute(&sql, params![new, Utc::now(), name, partition, old])
            .map_err(store_fault)?;
        Ok(rows > 0)
    }
}

impl SeqSynchronizer for SqliteSynchronizer {
    fn try_create(&self, name: &str, partition: &str, next_value: i64) -> SeqResult<bool> {
        let conn = self.acquire()?;
        self.insert_on(&conn, name, partition, next_value)
    }

    fn try_update(
        &self,
        name: &str,
        partition: &str,
        next_value_old: i64,
        next_value_new: i64,
    ) -> SeqResult<bool> {
        let conn = self.acquire()?;
        self.update_on(&conn, name, partition, next_value_old, next_value_new)
    }

    fn try_add_and_get(
        &self,
        name: &str,
        partition: &str,
        delta: i64,
        max_retry: i32,
    ) -> SeqResult<AddState> {
        // One connection for the whole loop; released on every exit path
        // when the pooled handle drops.
        let conn = self.acquire()?;
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let last = self
                .select_on(&conn, name, partition)?
                .ok_or_else(|| SeqError::not_found(name, partition))?;
            let target = last.wrapping_add(delta);
            if self.update_on(&conn, name, partition, last, target)? {
                return Ok(AddState::success(last, target, attempts));
            }
            if max_retry >= 0 && attempts >= max_retry as u32 + 1 {
                return Ok(AddState::failure(last, attempts));
            }
        }
    }

    fn next_value(&self, name: &str, partition: &str) -> SeqResult<Option<i64>> {
        let conn = self.acquire()?;
        self.select_on(&conn, name, partition)
    }

    fn init(&mut self) -> SeqResult<()> {
        self.create_table()
    }

    fn query_count(&self) -> u64 {
        self.stats.queries()
    }

    fn update_count(&self) -> u64 {
        self.stats.updates()
    }
}

fn store_fault(err: impl std::fmt::Display) -> SeqError {
    SeqError::store(err.to_string())
}
