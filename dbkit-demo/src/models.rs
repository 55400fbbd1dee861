//! Demo models

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Stored customer; nullable columns are `Option`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub balance: i64,
    pub rating: f64,
    pub birth_date: Option<NaiveDate>,
    pub married: bool,
    pub created_at: NaiveDateTime,
}

/// Customer fields supplied by the caller; `created_at` is set by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub balance: i64,
    pub rating: f64,
    pub birth_date: Option<NaiveDate>,
    pub married: bool,
}

impl NewCustomer {
    /// Customer with only the required columns set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            balance: 0,
            rating: 0.0,
            birth_date: None,
            married: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub email: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub email: String,
    pub comment: Option<String>,
}

impl NewComment {
    pub fn new(email: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            comment: Some(comment.into()),
        }
    }
}
