//! Pooled database handle
//!
//! [`Database`] owns the connection pool and is the entry point for every
//! operation. It is cheap to clone and safe to share between tasks; clones
//! share the same pool. There is no process-wide handle: callers construct a
//! `Database` and pass it to whatever needs it.

use super::connection::Connection;
use super::exec;
use super::prepared::PreparedStatement;
use super::transaction::Transaction;
use super::{ExecOutcome, Params, ResultRow, Rows, Statement};
use crate::config::DatabaseConfig;
use crate::{Error, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open connections, busy or idle
    pub size: u32,
    /// Open connections not checked out
    pub idle: usize,
    /// Configured ceiling on open connections
    pub max_open: u32,
}

impl PoolStatus {
    pub fn in_use(&self) -> u32 {
        self.size.saturating_sub(self.idle as u32)
    }
}

/// Pool handle seen by the release hook when capping idle connections
type PoolSlot = Arc<Mutex<Option<SqlitePool>>>;

/// Clears the release hook's pool handle once the last `Database` clone drops
///
/// The hook lives inside the pool, so a strong handle left in the slot would
/// keep the pool alive forever.
struct IdleCap {
    slot: PoolSlot,
}

impl Drop for IdleCap {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.take();
        }
    }
}

/// Whether a connection coming back to the pool may stay idle
fn keep_idle(slot: &PoolSlot, max_idle: u32) -> bool {
    match slot.lock() {
        Ok(slot) => match slot.as_ref() {
            Some(pool) => pool.num_idle() < max_idle as usize,
            None => true,
        },
        Err(_) => true,
    }
}

/// Connection-pool-backed command executor
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    max_open: u32,
    deadline: Option<Duration>,
    idle_cap: Arc<IdleCap>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("max_open", &self.max_open)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Build the pool and open the first connection
    ///
    /// Connection settings:
    /// - WAL journal mode so readers do not block the writer
    /// - Normal synchronous mode
    /// - Foreign keys enforced
    /// - Busy timeout from config
    ///
    /// Pool settings:
    /// - At most `max_open_conns` connections open; callers beyond it wait
    /// - At most `max_idle_conns` kept idle; extra connections are closed on
    ///   release
    /// - Idle connections closed after `max_idle_time_secs`
    ///
    /// Fails with a connection error if the config is invalid or the store
    /// cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;

        if config.create_if_missing && !config.is_in_memory() {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| Error::Connection(sqlx::Error::Io(e)))?;
                }
            }
        }

        let options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(Error::Connection)?
        } else {
            SqliteConnectOptions::new().filename(&config.path)
        };
        let options = options
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout());

        let pool_config = &config.pool;
        let slot: PoolSlot = Arc::new(Mutex::new(None));
        let hook_slot = Arc::clone(&slot);

        // An in-memory store lives only while a connection to it is open
        let min_connections = if config.is_in_memory() { 1 } else { 0 };
        let max_idle = pool_config.max_idle_conns.max(min_connections);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_config.max_open_conns)
            .min_connections(min_connections)
            .after_release(move |_conn, _meta| {
                let keep = keep_idle(&hook_slot, max_idle);
                if !keep {
                    debug!(max_idle, "Idle ceiling reached, closing released connection");
                }
                Box::pin(async move { Ok::<_, sqlx::Error>(keep) })
            })
            .idle_timeout(Some(pool_config.max_idle_time()))
            .max_lifetime(Some(pool_config.max_lifetime()))
            .acquire_timeout(pool_config.acquire_timeout())
            .connect_with(options)
            .await
            .map_err(Error::Connection)?;

        if let Ok(mut guard) = slot.lock() {
            *guard = Some(pool.clone());
        }

        info!(
            path = %config.path.display(),
            max_open = pool_config.max_open_conns,
            max_idle = pool_config.max_idle_conns,
            "Opened database pool"
        );

        Ok(Self {
            pool,
            max_open: pool_config.max_open_conns,
            deadline: config.statement_timeout(),
            idle_cap: Arc::new(IdleCap { slot }),
        })
    }

    /// Handle sharing this pool whose calls are bounded by `limit`
    ///
    /// ```ignore
    /// db.timeout(Duration::from_millis(500)).execute(&stmt, params).await?;
    /// ```
    pub fn timeout(&self, limit: Duration) -> Self {
        Self {
            deadline: Some(limit),
            ..self.clone()
        }
    }

    /// Deadline applied to calls made through this handle
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Check out one physical connection
    ///
    /// Waits while the pool is saturated. The connection goes back to the
    /// pool when the returned handle is dropped.
    pub async fn acquire(&self) -> Result<Connection> {
        let start = Instant::now();
        let conn = exec::with_deadline(self.deadline, self.pool.acquire()).await?;
        log_acquire_wait(start, "acquire");
        Ok(Connection::new(conn, self.deadline))
    }

    /// Run a non-query statement with bound parameters
    pub async fn execute(&self, statement: &Statement, params: Params) -> Result<ExecOutcome> {
        exec::execute(&self.pool, statement, params, self.deadline).await
    }

    /// Open a lazy cursor over a read statement
    ///
    /// No connection is taken until the first row is requested.
    pub fn query<'a>(&'a self, statement: &'a Statement, params: Params) -> Result<Rows<'a>> {
        exec::fetch(&self.pool, statement, params, self.deadline)
    }

    pub async fn fetch_all(&self, statement: &Statement, params: Params) -> Result<Vec<ResultRow>> {
        exec::fetch_all(&self.pool, statement, params, self.deadline).await
    }

    /// First row, or a scan error if the result is empty
    pub async fn fetch_one(&self, statement: &Statement, params: Params) -> Result<ResultRow> {
        exec::fetch_one(&self.pool, statement, params, self.deadline).await
    }

    pub async fn fetch_optional(
        &self,
        statement: &Statement,
        params: Params,
    ) -> Result<Option<ResultRow>> {
        exec::fetch_optional(&self.pool, statement, params, self.deadline).await
    }

    /// Compile a statement once for repeated execution
    ///
    /// The prepared statement holds one pooled connection until closed or
    /// dropped.
    pub async fn prepare(&self, statement: &Statement) -> Result<PreparedStatement> {
        let conn = self.acquire().await?;
        PreparedStatement::prepare(conn, statement).await
    }

    /// Start a transaction on a dedicated connection
    pub async fn begin(&self) -> Result<Transaction> {
        let start = Instant::now();
        debug!("Connection acquisition requested for transaction");
        let tx = exec::with_deadline(self.deadline, self.pool.begin()).await?;
        log_acquire_wait(start, "begin");
        Ok(Transaction::new(tx, self.deadline))
    }

    /// Round-trip a trivial statement to verify the store is reachable
    pub async fn ping(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");
        self.execute(&statement, Params::new()).await.map(|_| ())
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_open: self.max_open,
        }
    }

    /// Close every connection; waits for checked-out connections to return
    pub async fn close(&self) {
        if let Ok(mut slot) = self.idle_cap.slot.lock() {
            slot.take();
        }
        self.pool.close().await;
        info!("Closed database pool");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// The underlying sqlx pool for direct query execution
    #[inline]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }
}

fn log_acquire_wait(start: Instant, operation: &'static str) {
    let wait_ms = start.elapsed().as_millis() as u64;
    if wait_ms > 1000 {
        warn!(
            operation,
            wait_ms, "Slow connection acquisition, pool may be saturated"
        );
    } else {
        debug!(operation, wait_ms, "Connection acquired");
    }
}
