//! Database access helper
//!
//! Data flow:
//! - `Database::connect(config)` builds the pool
//! - `execute` / `query` / `fetch_*` run statements with bound parameters
//! - `prepare` compiles a statement for repeated execution
//! - `begin` opens a [`Transaction`] that ends in commit or rollback

mod connection;
mod exec;
mod pool;
mod prepared;
mod rows;
mod statement;
mod transaction;
mod value;

pub use connection::Connection;
pub use exec::ExecOutcome;
pub use pool::{Database, PoolStatus};
pub use prepared::PreparedStatement;
pub use rows::{ResultRow, Rows};
pub use statement::Statement;
pub use transaction::Transaction;
pub use value::{Params, Value};
