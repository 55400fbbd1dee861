//! Demo schema
//!
//! Every table is created with `IF NOT EXISTS`, so `init_schema` is safe to
//! call on each startup.

use dbkit_common::{params, Database, Result, Statement};
use tracing::info;

pub async fn init_schema(db: &Database) -> Result<()> {
    create_customers_table(db).await?;
    create_users_table(db).await?;
    create_comments_table(db).await?;
    info!("Demo schema initialized");
    Ok(())
}

async fn create_customers_table(db: &Database) -> Result<()> {
    db.execute(
        &Statement::new(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                balance INTEGER NOT NULL DEFAULT 0,
                rating REAL NOT NULL DEFAULT 0.0,
                birth_date DATE,
                married BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
        params![],
    )
    .await?;

    Ok(())
}

async fn create_users_table(db: &Database) -> Result<()> {
    db.execute(
        &Statement::new(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL
            )
            "#,
        ),
        params![],
    )
    .await?;

    Ok(())
}

async fn create_comments_table(db: &Database) -> Result<()> {
    db.execute(
        &Statement::new(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL CHECK (instr(email, '@') > 1),
                comment TEXT
            )
            "#,
        ),
        params![],
    )
    .await?;

    db.execute(
        &Statement::new("CREATE INDEX IF NOT EXISTS idx_comments_email ON comments(email)"),
        params![],
    )
    .await?;

    Ok(())
}
