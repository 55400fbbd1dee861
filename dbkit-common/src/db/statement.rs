//! Statement templates with positional placeholders

use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Immutable statement text with `?` placeholders
///
/// Values never go into the text; they are supplied separately as
/// [`Params`](super::Params) at execution time. The placeholder count is
/// computed once on construction so arity mismatches fail before the store
/// is contacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
    sql: Arc<str>,
    placeholders: usize,
}

impl Statement {
    pub fn new(sql: impl Into<Arc<str>>) -> Self {
        let sql = sql.into();
        let placeholders = count_placeholders(&sql);
        Self { sql, placeholders }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of positional parameters the statement expects
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    pub(crate) fn check_arity(&self, actual: usize) -> Result<()> {
        if actual == self.placeholders {
            Ok(())
        } else {
            Err(Error::ParameterCount {
                expected: self.placeholders,
                actual,
            })
        }
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &&*self.sql)
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Count positional parameters in SQLite statement text.
///
/// Skips `?` inside string literals, quoted identifiers and comments. A
/// numbered placeholder `?NNN` counts as parameter NNN, so the result is the
/// highest parameter index referenced.
fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let mut highest = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                // Doubled quote is an escaped quote; keep scanning
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'[' => {
                while i < bytes.len() && bytes[i] != b']' {
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'?' => {
                i += 1;
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let index = if i > start {
                    sql[start..i].parse::<usize>().unwrap_or(0)
                } else {
                    highest + 1
                };
                highest = highest.max(index);
            }
            _ => i += 1,
        }
    }

    highest
}
