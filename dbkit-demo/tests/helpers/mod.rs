//! Shared fixtures for dbkit-demo integration tests

#![allow(dead_code)]

use dbkit_common::{Database, DatabaseConfig};
use dbkit_demo::init_schema;
use tempfile::TempDir;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn demo_config(dir: &TempDir) -> DatabaseConfig {
    let mut config = DatabaseConfig::for_path(dir.path().join("demo.db"));
    config.pool.max_open_conns = 4;
    config.pool.max_idle_conns = 1;
    config
}

/// Fresh database with the demo schema
pub async fn open_demo(dir: &TempDir) -> Database {
    init_tracing();
    let db = Database::connect(&demo_config(dir)).await.unwrap();
    init_schema(&db).await.unwrap();
    db
}
