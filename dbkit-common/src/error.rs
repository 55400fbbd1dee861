//! Common error types for dbkit

use std::time::Duration;
use thiserror::Error;

/// Common result type for dbkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the access helper
///
/// Nothing is retried internally; every failure is returned to the caller as
/// soon as it happens.
#[derive(Error, Debug)]
pub enum Error {
    /// Could not establish or keep a connection to the store
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Statement was malformed or rejected by the store
    #[error("Statement error: {0}")]
    Statement(#[source] sqlx::Error),

    /// Wrong number of bound parameters for the statement's placeholders
    #[error("Statement expects {expected} parameter(s), got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    /// Result row did not have the shape the caller asked for
    #[error("Scan error: {0}")]
    Scan(#[source] sqlx::Error),

    /// Commit or rollback failed
    #[error("Transaction error: {0}")]
    Transaction(#[source] sqlx::Error),

    /// Per-call deadline elapsed before the operation finished
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Pool settings rejected before connecting
    #[error("Invalid connection settings: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant broken
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`Error`] for callers deciding how to recover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Statement,
    Scan,
    Transaction,
    Timeout,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) | Error::InvalidConfig(_) => ErrorKind::Connection,
            Error::Statement(_) | Error::ParameterCount { .. } => ErrorKind::Statement,
            Error::Scan(_) => ErrorKind::Scan,
            Error::Transaction(_) => ErrorKind::Transaction,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => ErrorKind::Config,
        }
    }

    /// True when the store rejected the statement over a constraint
    /// (unique, foreign key, not null, check).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Error::Statement(sqlx::Error::Database(db)) => {
                !matches!(db.kind(), sqlx::error::ErrorKind::Other)
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::Connection(err),

            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => Error::Scan(err),

            _ => Error::Statement(err),
        }
    }
}
