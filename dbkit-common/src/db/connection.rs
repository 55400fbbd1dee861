//! A single checked-out connection

use super::exec;
use super::{ExecOutcome, Params, ResultRow, Rows, Statement};
use crate::Result;
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use std::time::Duration;

/// One physical connection taken from the pool
///
/// Not shared: confine it to one caller and let it drop (or call
/// [`Connection::release`]) to hand it back.
#[derive(Debug)]
pub struct Connection {
    conn: PoolConnection<Sqlite>,
    deadline: Option<Duration>,
}

impl Connection {
    pub(crate) fn new(conn: PoolConnection<Sqlite>, deadline: Option<Duration>) -> Self {
        Self { conn, deadline }
    }

    pub async fn execute(&mut self, statement: &Statement, params: Params) -> Result<ExecOutcome> {
        exec::execute(&mut *self.conn, statement, params, self.deadline).await
    }

    pub fn query<'a>(&'a mut self, statement: &'a Statement, params: Params) -> Result<Rows<'a>> {
        exec::fetch(&mut *self.conn, statement, params, self.deadline)
    }

    pub async fn fetch_all(
        &mut self,
        statement: &Statement,
        params: Params,
    ) -> Result<Vec<ResultRow>> {
        exec::fetch_all(&mut *self.conn, statement, params, self.deadline).await
    }

    pub async fn fetch_optional(
        &mut self,
        statement: &Statement,
        params: Params,
    ) -> Result<Option<ResultRow>> {
        exec::fetch_optional(&mut *self.conn, statement, params, self.deadline).await
    }

    pub async fn fetch_one(&mut self, statement: &Statement, params: Params) -> Result<ResultRow> {
        exec::fetch_one(&mut *self.conn, statement, params, self.deadline).await
    }

    pub(crate) fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub(crate) fn inner_mut(&mut self) -> &mut PoolConnection<Sqlite> {
        &mut self.conn
    }

    /// Return the connection to the pool
    pub fn release(self) {
        drop(self);
    }
}
