//! # dbkit common library
//!
//! Pooled SQLite access helper:
//! - Configuration loading (TOML + environment overrides)
//! - Connection pool construction with idle/open/lifetime tunables
//! - Raw and parameterized statement execution
//! - Lazy single-pass row cursors with typed, null-aware column access
//! - Prepared statements and transaction scoping
//!
//! Values always travel out-of-band as bound parameters; statement text is
//! never assembled from caller input.

pub mod config;
pub mod db;
pub mod error;

pub use config::{DatabaseConfig, PoolConfig};
pub use db::{
    Connection, Database, ExecOutcome, Params, PoolStatus, PreparedStatement, ResultRow, Rows,
    Statement, Transaction, Value,
};
pub use error::{Error, ErrorKind, Result};
