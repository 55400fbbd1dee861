//! Comment repository
//!
//! Three ways to write comments, from one-off to batched:
//! - [`insert_comment`]: single parameterized insert
//! - [`insert_comments_prepared`]: one prepared statement, many executions
//! - [`insert_comments_atomic`]: all inserts in one transaction

use crate::models::{Comment, NewComment};
use dbkit_common::{params, Database, Result, Statement};
use tracing::{info, warn};

const INSERT_COMMENT: &str = "INSERT INTO comments (email, comment) VALUES (?, ?)";

/// Insert one comment and return its assigned id
pub async fn insert_comment(db: &Database, comment: &NewComment) -> Result<i64> {
    let outcome = db
        .execute(
            &Statement::new(INSERT_COMMENT),
            params![&comment.email, comment.comment.clone()],
        )
        .await?;
    Ok(outcome.last_insert_id())
}

/// Insert comments through a single prepared statement
///
/// Returns assigned ids in input order.
pub async fn insert_comments_prepared(db: &Database, comments: &[NewComment]) -> Result<Vec<i64>> {
    let mut prepared = db.prepare(&Statement::new(INSERT_COMMENT)).await?;

    let mut ids = Vec::with_capacity(comments.len());
    for comment in comments {
        let outcome = prepared
            .execute(params![&comment.email, comment.comment.clone()])
            .await?;
        ids.push(outcome.last_insert_id());
    }

    prepared.close();
    Ok(ids)
}

/// Insert comments atomically: all are stored or none are
///
/// On the first failure the transaction is rolled back and the insert
/// error returned.
pub async fn insert_comments_atomic(db: &Database, comments: &[NewComment]) -> Result<Vec<i64>> {
    let statement = Statement::new(INSERT_COMMENT);
    let mut tx = db.begin().await?;

    let mut ids = Vec::with_capacity(comments.len());
    for comment in comments {
        match tx
            .execute(&statement, params![&comment.email, comment.comment.clone()])
            .await
        {
            Ok(outcome) => ids.push(outcome.last_insert_id()),
            Err(e) => {
                warn!(inserted = ids.len(), "Comment batch failed, rolling back: {}", e);
                tx.rollback().await?;
                return Err(e);
            }
        }
    }

    tx.commit().await?;
    info!(count = ids.len(), "Comment batch committed");
    Ok(ids)
}

pub async fn find_comment(db: &Database, id: i64) -> Result<Option<Comment>> {
    db.fetch_optional(
        &Statement::new("SELECT id, email, comment FROM comments WHERE id = ?"),
        params![id],
    )
    .await?
    .map(|row| row.decode::<Comment>())
    .transpose()
}

pub async fn comments_by_email(db: &Database, email: &str) -> Result<Vec<Comment>> {
    db.fetch_all(
        &Statement::new("SELECT id, email, comment FROM comments WHERE email = ? ORDER BY id"),
        params![email],
    )
    .await?
    .into_iter()
    .map(|row| row.decode::<Comment>())
    .collect()
}

pub async fn count_comments(db: &Database) -> Result<i64> {
    let row = db
        .fetch_one(&Statement::new("SELECT COUNT(*) FROM comments"), params![])
        .await?;
    row.get(0)
}
