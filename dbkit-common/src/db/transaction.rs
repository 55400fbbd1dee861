//! Transaction scoping with hold-time logging

use super::exec::{self, ExecOutcome};
use super::{Params, ResultRow, Rows, Statement};
use crate::{Error, Result};
use sqlx::Sqlite;
use std::time::{Duration, Instant};

/// Hold time above which commit/rollback is logged as a long transaction
const LONG_TRANSACTION_MS: u128 = 2000;

/// Atomic group of statements on one connection
///
/// Lifecycle: begin, any number of executes, then exactly one of
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). Both consume the
/// handle. A handle dropped without either is rolled back by the driver and
/// logged as a warning, since it usually means an error path skipped cleanup.
pub struct Transaction {
    tx: Option<sqlx::Transaction<'static, Sqlite>>,
    deadline: Option<Duration>,
    begun_at: Instant,
    statements: u64,
}

impl Transaction {
    pub(crate) fn new(tx: sqlx::Transaction<'static, Sqlite>, deadline: Option<Duration>) -> Self {
        Self {
            tx: Some(tx),
            deadline,
            begun_at: Instant::now(),
            statements: 0,
        }
    }

    fn inner_mut(&mut self) -> Result<&mut sqlx::Transaction<'static, Sqlite>> {
        self.tx
            .as_mut()
            .ok_or_else(|| Error::Internal("transaction already finished".to_string()))
    }

    /// Statements executed inside this transaction so far
    pub fn statements(&self) -> u64 {
        self.statements
    }

    pub async fn execute(&mut self, statement: &Statement, params: Params) -> Result<ExecOutcome> {
        let deadline = self.deadline;
        let tx = self.inner_mut()?;
        let outcome = exec::execute(&mut **tx, statement, params, deadline).await?;
        self.statements += 1;
        Ok(outcome)
    }

    pub fn query<'a>(&'a mut self, statement: &'a Statement, params: Params) -> Result<Rows<'a>> {
        let deadline = self.deadline;
        self.statements += 1;
        let tx = self.inner_mut()?;
        exec::fetch(&mut **tx, statement, params, deadline)
    }

    pub async fn fetch_all(
        &mut self,
        statement: &Statement,
        params: Params,
    ) -> Result<Vec<ResultRow>> {
        self.query(statement, params)?.all().await
    }

    pub async fn fetch_optional(
        &mut self,
        statement: &Statement,
        params: Params,
    ) -> Result<Option<ResultRow>> {
        let deadline = self.deadline;
        self.statements += 1;
        let tx = self.inner_mut()?;
        exec::fetch_optional(&mut **tx, statement, params, deadline).await
    }

    pub async fn fetch_one(&mut self, statement: &Statement, params: Params) -> Result<ResultRow> {
        let deadline = self.deadline;
        self.statements += 1;
        let tx = self.inner_mut()?;
        exec::fetch_one(&mut **tx, statement, params, deadline).await
    }

    /// Make every write in the transaction durable
    pub async fn commit(mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Internal("transaction already finished".to_string()))?;

        exec::with_deadline_map(self.deadline, tx.commit(), Error::Transaction).await?;
        self.log_release("commit");
        Ok(())
    }

    /// Discard every write in the transaction
    pub async fn rollback(mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Internal("transaction already finished".to_string()))?;

        exec::with_deadline_map(self.deadline, tx.rollback(), Error::Transaction).await?;
        self.log_release("rollback");
        Ok(())
    }

    fn log_release(&self, how: &'static str) {
        let held_ms = self.begun_at.elapsed().as_millis();
        if held_ms > LONG_TRANSACTION_MS {
            tracing::warn!(
                how,
                held_ms = held_ms as u64,
                statements = self.statements,
                "Long transaction, connection held for an extended period"
            );
        } else {
            tracing::debug!(
                how,
                held_ms = held_ms as u64,
                statements = self.statements,
                "Transaction finished"
            );
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!(
                held_ms = self.begun_at.elapsed().as_millis() as u64,
                statements = self.statements,
                "Transaction dropped without commit or rollback, rolling back"
            );
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.tx.is_some())
            .field("statements", &self.statements)
            .finish_non_exhaustive()
    }
}
