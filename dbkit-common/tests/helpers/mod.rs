//! Shared fixtures for dbkit-common integration tests

#![allow(dead_code)]

use dbkit_common::{params, Database, DatabaseConfig, Statement};
use tempfile::TempDir;

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Config for a fresh database file inside `dir`, with a small pool
pub fn test_config(dir: &TempDir) -> DatabaseConfig {
    let mut config = DatabaseConfig::for_path(dir.path().join("test.db"));
    config.pool.max_open_conns = 4;
    config.pool.max_idle_conns = 1;
    config.pool.acquire_timeout_secs = 10;
    config
}

/// Open a pool on a fresh database with a `people` table
pub async fn open_with_people(dir: &TempDir) -> Database {
    init_tracing();
    let db = Database::connect(&test_config(dir)).await.unwrap();
    db.execute(
        &Statement::new(
            r#"
            CREATE TABLE people (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                score INTEGER NOT NULL,
                rating REAL NOT NULL,
                note TEXT
            )
            "#,
        ),
        params![],
    )
    .await
    .unwrap();
    db
}

pub async fn count_people(db: &Database) -> i64 {
    db.fetch_one(&Statement::new("SELECT COUNT(*) FROM people"), params![])
        .await
        .unwrap()
        .get::<i64, _>(0)
        .unwrap()
}
