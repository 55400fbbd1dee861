//! Prepared statements pinned to one pooled connection

use super::connection::Connection;
use super::exec::{self, ExecOutcome};
use super::rows::{Deadline, Rows};
use super::{Params, Statement};
use crate::Result;
use sqlx::sqlite::SqliteStatement;
use sqlx::Executor;
use std::time::Instant;
use tracing::debug;

/// A statement compiled once and executed many times
///
/// The compiled form lives on one physical connection, so the prepared
/// statement keeps that connection checked out until [`close`](Self::close)
/// or drop. Do not hold one while waiting on the same pool from the same
/// caller if the pool has a single connection.
pub struct PreparedStatement {
    conn: Connection,
    statement: Statement,
    compiled: SqliteStatement<'static>,
    executions: u64,
}

impl PreparedStatement {
    pub(crate) async fn prepare(mut conn: Connection, statement: &Statement) -> Result<Self> {
        let deadline = conn.deadline();
        let compiled = {
            let raw = conn.inner_mut();
            exec::with_deadline(deadline, (&mut **raw).prepare(statement.sql())).await?
        };
        let compiled = sqlx::Statement::to_owned(&compiled);

        debug!(sql = statement.sql(), "Statement prepared");

        Ok(Self {
            conn,
            statement: statement.clone(),
            compiled,
            executions: 0,
        })
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Executions and cursors opened so far
    ///
    /// Calls rejected by the parameter count check are not counted.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// Run the compiled statement with a fresh set of parameters
    pub async fn execute(&mut self, params: Params) -> Result<ExecOutcome> {
        self.statement.check_arity(params.len())?;

        let start = Instant::now();
        let deadline = self.conn.deadline();
        let query = params.bind_to(sqlx::Statement::query(&self.compiled));
        let result =
            exec::with_deadline(deadline, query.execute(&mut **self.conn.inner_mut())).await?;
        let outcome = ExecOutcome::from(result);
        self.executions += 1;

        debug!(
            sql = self.statement.sql(),
            execution = self.executions,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prepared statement executed"
        );

        Ok(outcome)
    }

    /// Open a cursor over the compiled statement's results
    pub fn query(&mut self, params: Params) -> Result<Rows<'_>> {
        self.statement.check_arity(params.len())?;

        let deadline = self.conn.deadline().map(Deadline::after);
        let query = params.bind_to(sqlx::Statement::query(&self.compiled));
        let stream = query.fetch(&mut **self.conn.inner_mut());
        self.executions += 1;
        Ok(Rows::new(stream, deadline))
    }

    /// Release the compiled statement and its connection
    pub fn close(self) {
        debug!(
            sql = self.statement.sql(),
            executions = self.executions,
            "Prepared statement closed"
        );
        self.conn.release();
    }
}

impl std::fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("statement", &self.statement)
            .field("executions", &self.executions)
            .finish_non_exhaustive()
    }
}

