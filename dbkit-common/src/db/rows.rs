//! Result rows and lazy row cursors

use crate::{Error, Result};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, ColumnIndex, Decode, FromRow, Row, Sqlite, Type, TypeInfo, ValueRef};
use std::time::Duration;
use tokio::time::Instant;

/// One row of a query result
///
/// Columns that may be NULL are read as `Option<T>`, which yields `None`
/// for SQL NULL.
pub struct ResultRow {
    row: SqliteRow,
}

impl ResultRow {
    /// Read one column by position or name
    pub fn get<'r, T, I>(&'r self, index: I) -> Result<T>
    where
        I: ColumnIndex<SqliteRow>,
        T: Decode<'r, Sqlite> + Type<Sqlite>,
    {
        self.row.try_get(index).map_err(Error::Scan)
    }

    /// Map the whole row onto a `FromRow` type
    pub fn decode<T>(&self) -> Result<T>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        T::from_row(&self.row).map_err(Error::Scan)
    }

    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// Column names in select order
    pub fn columns(&self) -> Vec<&str> {
        self.row.columns().iter().map(|c| c.name()).collect()
    }

    /// Render the row as a JSON object keyed by column name
    ///
    /// SQL NULL becomes JSON null; blobs become arrays of byte values.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::with_capacity(self.row.len());

        for (i, column) in self.row.columns().iter().enumerate() {
            let value = match self.row.try_get_raw(i) {
                Ok(raw) if raw.is_null() => serde_json::Value::Null,
                Ok(raw) => {
                    let storage = raw.type_info().name().to_string();
                    self.column_json(i, &storage)
                }
                Err(_) => serde_json::Value::Null,
            };
            object.insert(column.name().to_string(), value);
        }

        serde_json::Value::Object(object)
    }

    fn column_json(&self, index: usize, storage: &str) -> serde_json::Value {
        let value = match storage {
            "INTEGER" | "BOOLEAN" => self.row.try_get::<i64, _>(index).map(Into::into),
            "REAL" => self.row.try_get::<f64, _>(index).map(Into::into),
            "BLOB" => self.row.try_get::<Vec<u8>, _>(index).map(Into::into),
            _ => self.row.try_get::<String, _>(index).map(Into::into),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    pub fn into_inner(self) -> SqliteRow {
        self.row
    }
}

impl std::fmt::Debug for ResultRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRow")
            .field("columns", &self.columns())
            .finish()
    }
}

impl From<SqliteRow> for ResultRow {
    fn from(row: SqliteRow) -> Self {
        Self { row }
    }
}

/// Absolute deadline for a call, remembered with its budget for reporting
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }
}

/// Single-pass cursor over query results
///
/// Rows are pulled from the store on demand. The cursor cannot be rewound.
/// Dropping it (or calling [`Rows::close`]) before the end releases the
/// cursor and returns its connection to the pool.
pub struct Rows<'e> {
    inner: BoxStream<'e, std::result::Result<SqliteRow, sqlx::Error>>,
    deadline: Option<Deadline>,
    fetched: usize,
    done: bool,
}

impl<'e> Rows<'e> {
    pub(crate) fn new(
        inner: BoxStream<'e, std::result::Result<SqliteRow, sqlx::Error>>,
        deadline: Option<Deadline>,
    ) -> Self {
        Self {
            inner,
            deadline,
            fetched: 0,
            done: false,
        }
    }

    /// Fetch the next row, or `None` once the result is exhausted
    pub async fn next(&mut self) -> Result<Option<ResultRow>> {
        if self.done {
            return Ok(None);
        }

        let next = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline.at, self.inner.try_next())
                .await
                .map_err(|_| Error::Timeout(deadline.budget))?,
            None => self.inner.try_next().await,
        };

        match next {
            Ok(Some(row)) => {
                self.fetched += 1;
                Ok(Some(ResultRow::from(row)))
            }
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                Err(Error::from(e))
            }
        }
    }

    /// Drain every remaining row
    pub async fn all(mut self) -> Result<Vec<ResultRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rows handed out so far
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Release the cursor without reading the remaining rows
    pub fn close(self) {
        if !self.done {
            tracing::debug!(fetched = self.fetched, "Cursor released before exhaustion");
        }
    }
}

impl std::fmt::Debug for Rows<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("fetched", &self.fetched)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
