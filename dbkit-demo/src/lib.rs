//! # dbkit demo
//!
//! Customer, user and comment repositories built on `dbkit-common`, plus a
//! walkthrough that runs every access pattern in order:
//! - Raw insert and select
//! - Multi-type select with nullable columns
//! - Login lookup with bound parameters
//! - Auto-increment ids
//! - Prepared statement loop
//! - Transaction loop

pub mod comments;
pub mod customers;
pub mod models;
pub mod schema;
pub mod users;
pub mod walkthrough;

pub use models::{Comment, Customer, NewComment, NewCustomer};
pub use schema::init_schema;
