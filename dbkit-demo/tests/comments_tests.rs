//! Comment repository tests: auto-increment ids, prepared loop, atomic batch

mod helpers;

use dbkit_common::ErrorKind;
use dbkit_demo::comments::{
    comments_by_email, count_comments, find_comment, insert_comment, insert_comments_atomic,
    insert_comments_prepared,
};
use dbkit_demo::NewComment;
use helpers::open_demo;
use tempfile::TempDir;

fn batch(prefix: &str, n: usize) -> Vec<NewComment> {
    (1..=n)
        .map(|i| NewComment::new(format!("{}{}@gmail.com", prefix, i), format!("Comment to {}", i)))
        .collect()
}

#[tokio::test]
async fn test_insert_returns_auto_increment_id() {
    let dir = TempDir::new().unwrap();
    let db = open_demo(&dir).await;

    let first = insert_comment(&db, &NewComment::new("rahmat@rahmat.com", "test comment"))
        .await
        .unwrap();
    let second = insert_comment(&db, &NewComment::new("rahmat@rahmat.com", "again"))
        .await
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);

    let stored = find_comment(&db, first).await.unwrap().unwrap();
    assert_eq!(stored.email, "rahmat@rahmat.com");
    assert_eq!(stored.comment.as_deref(), Some("test comment"));
}

#[tokio::test]
async fn test_comment_without_body_reads_as_none() {
    let dir = TempDir::new().unwrap();
    let db = open_demo(&dir).await;

    let id = insert_comment(
        &db,
        &NewComment {
            email: "quiet@example.com".to_string(),
            comment: None,
        },
    )
    .await
    .unwrap();

    let stored = find_comment(&db, id).await.unwrap().unwrap();
    assert_eq!(stored.comment, None);
}

#[tokio::test]
async fn test_prepared_loop_stores_distinct_rows_with_increasing_ids() {
    let dir = TempDir::new().unwrap();
    let db = open_demo(&dir).await;

    let ids = insert_comments_prepared(&db, &batch("rahmat", 10))
        .await
        .unwrap();

    assert_eq!(ids.len(), 10);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {:?}", ids);
    assert_eq!(count_comments(&db).await.unwrap(), 10);

    let third = comments_by_email(&db, "rahmat3@gmail.com").await.unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].id, ids[2]);
    assert_eq!(third[0].comment.as_deref(), Some("Comment to 3"));
}

#[tokio::test]
async fn test_atomic_batch_commits_all() {
    let dir = TempDir::new().unwrap();
    let db = open_demo(&dir).await;

    let ids = insert_comments_atomic(&db, &batch("budi", 10)).await.unwrap();

    assert_eq!(ids.len(), 10);
    assert_eq!(count_comments(&db).await.unwrap(), 10);
}

#[tokio::test]
async fn test_atomic_batch_rolls_back_on_failure() {
    let dir = TempDir::new().unwrap();
    let db = open_demo(&dir).await;

    insert_comment(&db, &NewComment::new("before@example.com", "kept"))
        .await
        .unwrap();

    let mut comments = batch("budi", 5);
    // Rejected by the email check constraint
    comments.insert(3, NewComment::new("not-an-email", "bad"));

    let err = insert_comments_atomic(&db, &comments).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Statement);
    assert!(err.is_constraint_violation());

    assert_eq!(count_comments(&db).await.unwrap(), 1);
    assert!(comments_by_email(&db, "budi1@gmail.com")
        .await
        .unwrap()
        .is_empty());
}
