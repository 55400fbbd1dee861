//! Statement execution shared by pool, connection and transaction handles

use super::rows::{Deadline, ResultRow, Rows};
use super::{Params, Statement};
use crate::{Error, Result};
use sqlx::sqlite::SqliteQueryResult;
use sqlx::{Executor, Sqlite};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a non-query statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    rows_affected: u64,
    last_insert_id: i64,
}

impl ExecOutcome {
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Row id assigned by the most recent successful insert on the connection
    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }
}

impl From<SqliteQueryResult> for ExecOutcome {
    fn from(result: SqliteQueryResult) -> Self {
        Self {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        }
    }
}

/// Await a driver future, bounded by an optional deadline
pub(crate) async fn with_deadline<F, T>(deadline: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    with_deadline_map(deadline, fut, Error::from).await
}

/// Like [`with_deadline`], with driver errors classified by `classify`
pub(crate) async fn with_deadline_map<F, T>(
    deadline: Option<Duration>,
    fut: F,
    classify: fn(sqlx::Error) -> Error,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?
            .map_err(classify),
        None => fut.await.map_err(classify),
    }
}

pub(crate) async fn execute<'c, E>(
    executor: E,
    statement: &Statement,
    params: Params,
    deadline: Option<Duration>,
) -> Result<ExecOutcome>
where
    E: Executor<'c, Database = Sqlite>,
{
    statement.check_arity(params.len())?;

    let start = Instant::now();
    let query = params.bind_to(sqlx::query(statement.sql()));
    let result = with_deadline(deadline, query.execute(executor)).await?;
    let outcome = ExecOutcome::from(result);

    debug!(
        sql = statement.sql(),
        rows_affected = outcome.rows_affected,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Statement executed"
    );

    Ok(outcome)
}

pub(crate) fn fetch<'e, 'c: 'e, E>(
    executor: E,
    statement: &'e Statement,
    params: Params,
    deadline: Option<Duration>,
) -> Result<Rows<'e>>
where
    E: 'e + Executor<'c, Database = Sqlite>,
{
    statement.check_arity(params.len())?;

    let query = params.bind_to(sqlx::query(statement.sql()));
    debug!(sql = statement.sql(), "Query opened");
    Ok(Rows::new(query.fetch(executor), deadline.map(Deadline::after)))
}

pub(crate) async fn fetch_all<'e, 'c: 'e, E>(
    executor: E,
    statement: &'e Statement,
    params: Params,
    deadline: Option<Duration>,
) -> Result<Vec<ResultRow>>
where
    E: 'e + Executor<'c, Database = Sqlite>,
{
    fetch(executor, statement, params, deadline)?.all().await
}

pub(crate) async fn fetch_optional<'e, 'c: 'e, E>(
    executor: E,
    statement: &'e Statement,
    params: Params,
    deadline: Option<Duration>,
) -> Result<Option<ResultRow>>
where
    E: 'e + Executor<'c, Database = Sqlite>,
{
    let mut rows = fetch(executor, statement, params, deadline)?;
    let first = rows.next().await?;
    rows.close();
    Ok(first)
}

pub(crate) async fn fetch_one<'e, 'c: 'e, E>(
    executor: E,
    statement: &'e Statement,
    params: Params,
    deadline: Option<Duration>,
) -> Result<ResultRow>
where
    E: 'e + Executor<'c, Database = Sqlite>,
{
    fetch_optional(executor, statement, params, deadline)
        .await?
        .ok_or(Error::Scan(sqlx::Error::RowNotFound))
}
