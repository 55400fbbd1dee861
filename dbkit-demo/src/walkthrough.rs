//! End-to-end walkthrough of the access patterns
//!
//! Runs each step against a fresh pool and records what it observed. Steps
//! run in a fixed order and stop at the first failure, with the step named in
//! the error context.

use crate::models::{NewComment, NewCustomer};
use crate::{comments, customers, schema, users};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use dbkit_common::{Database, DatabaseConfig};
use tracing::info;
use uuid::Uuid;

/// Number of comments written by the prepared and transaction steps
const BATCH_SIZE: usize = 10;

/// What each walkthrough step observed
#[derive(Debug, Clone, Default)]
pub struct WalkthroughReport {
    pub customers: usize,
    pub customers_without_email: usize,
    pub admin_login: bool,
    pub injected_login: bool,
    pub single_comment_id: i64,
    pub prepared_comment_ids: Vec<i64>,
    pub transaction_comment_ids: Vec<i64>,
}

pub async fn run(config: &DatabaseConfig) -> Result<WalkthroughReport> {
    let db = Database::connect(config)
        .await
        .context("connecting to database")?;

    let report = run_steps(&db).await;
    db.close().await;
    report
}

async fn run_steps(db: &Database) -> Result<WalkthroughReport> {
    let mut report = WalkthroughReport::default();

    schema::init_schema(db).await.context("initializing schema")?;

    // Raw insert, then one with every column bound
    customers::insert_default_customer(db)
        .await
        .context("raw customer insert")?;

    let customer = NewCustomer {
        email: Some("budi@example.com".to_string()),
        balance: 1_000_000,
        rating: 90.5,
        birth_date: NaiveDate::from_ymd_opt(1995, 10, 10),
        married: true,
        ..NewCustomer::new(Uuid::new_v4().to_string(), "Budi")
    };
    customers::insert_customer(db, &customer)
        .await
        .context("parameterized customer insert")?;

    let all = customers::list_customers(db)
        .await
        .context("listing customers")?;
    report.customers = all.len();
    report.customers_without_email = all.iter().filter(|c| c.email.is_none()).count();
    for c in &all {
        info!(id = %c.id, name = %c.name, email = ?c.email, birth_date = ?c.birth_date, "Customer");
    }

    // Bound credentials: the injection payload is just an odd username
    users::create_user(db, "admin", "admin")
        .await
        .context("creating user")?;
    report.admin_login = users::login(db, "admin", "admin")
        .await
        .context("valid login")?
        .is_some();
    report.injected_login = users::login(db, "admin' --", "salah")
        .await
        .context("injection login")?
        .is_some();

    report.single_comment_id = comments::insert_comment(
        db,
        &NewComment::new("rahmat@example.com", "test comment"),
    )
    .await
    .context("single comment insert")?;

    let batch: Vec<NewComment> = (1..=BATCH_SIZE)
        .map(|i| NewComment::new(format!("rahmat{}@example.com", i), format!("Comment to {}", i)))
        .collect();
    report.prepared_comment_ids = comments::insert_comments_prepared(db, &batch)
        .await
        .context("prepared comment loop")?;

    let batch: Vec<NewComment> = (1..=BATCH_SIZE)
        .map(|i| {
            NewComment::new(
                format!("budi{}@example.com", i),
                format!("Comment budi to {}", i),
            )
        })
        .collect();
    report.transaction_comment_ids = comments::insert_comments_atomic(db, &batch)
        .await
        .context("transaction comment loop")?;

    info!(?report, "Walkthrough finished");
    Ok(report)
}
