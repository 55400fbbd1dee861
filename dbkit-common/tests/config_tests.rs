//! Unit tests for configuration loading and resolution
//!
//! Tests that touch DBKIT_CONFIG or DBKIT_DATABASE_PATH are marked #[serial]
//! so they do not race on process environment.

use dbkit_common::config::{CONFIG_ENV_VAR, DATABASE_PATH_ENV_VAR};
use dbkit_common::{DatabaseConfig, Error};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_parse_full_document() {
    let config = DatabaseConfig::from_toml_str(
        r#"
        [database]
        path = "/var/lib/shop/shop.db"
        busy_timeout_ms = 250
        statement_timeout_ms = 2000

        [database.pool]
        max_idle_conns = 2
        max_open_conns = 8
        max_idle_time_secs = 60
        max_lifetime_secs = 600
        acquire_timeout_secs = 5
        "#,
    )
    .unwrap();

    assert_eq!(config.path, PathBuf::from("/var/lib/shop/shop.db"));
    assert_eq!(config.busy_timeout(), Duration::from_millis(250));
    assert_eq!(config.statement_timeout(), Some(Duration::from_secs(2)));
    assert_eq!(config.pool.max_idle_conns, 2);
    assert_eq!(config.pool.max_open_conns, 8);
    assert_eq!(config.pool.max_idle_time(), Duration::from_secs(60));
    assert_eq!(config.pool.max_lifetime(), Duration::from_secs(600));
    assert_eq!(config.pool.acquire_timeout(), Duration::from_secs(5));
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_bare_document_uses_defaults() {
    let config = DatabaseConfig::from_toml_str(
        r#"
        path = "app.db"

        [pool]
        max_open_conns = 4
        "#,
    )
    .unwrap();

    assert_eq!(config.path, PathBuf::from("app.db"));
    assert!(config.create_if_missing);
    assert_eq!(config.pool.max_open_conns, 4);
    // Default idle count exceeds the lowered ceiling
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_parse_rejects_bad_types() {
    let err = DatabaseConfig::from_toml_str("[pool]\nmax_open_conns = \"many\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = DatabaseConfig::from_toml_str("this is not toml").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let err = DatabaseConfig::load(&PathBuf::from("/nonexistent/dbkit/config.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
#[serial]
fn test_resolve_explicit_path_wins() {
    env::remove_var(DATABASE_PATH_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("explicit.toml");
    std::fs::write(&explicit, "path = \"explicit.db\"\n").unwrap();

    let from_env = dir.path().join("env.toml");
    std::fs::write(&from_env, "path = \"env.db\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = DatabaseConfig::resolve(Some(&explicit)).unwrap();
    assert_eq!(config.path, PathBuf::from("explicit.db"));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_env_config_file() {
    env::remove_var(DATABASE_PATH_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let from_env = dir.path().join("env.toml");
    std::fs::write(&from_env, "path = \"env.db\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = DatabaseConfig::resolve(None).unwrap();
    assert_eq!(config.path, PathBuf::from("env.db"));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_database_path_env_override() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "path = \"from-file.db\"\n").unwrap();
    env::set_var(DATABASE_PATH_ENV_VAR, "/tmp/override.db");

    let config = DatabaseConfig::resolve(Some(&file)).unwrap();
    assert_eq!(config.path, PathBuf::from("/tmp/override.db"));

    env::remove_var(DATABASE_PATH_ENV_VAR);
}

#[test]
#[serial]
fn test_empty_override_ignored() {
    env::set_var(DATABASE_PATH_ENV_VAR, "  ");
    let config = DatabaseConfig::for_path("keep.db").with_env_overrides();
    assert_eq!(config.path, PathBuf::from("keep.db"));
    env::remove_var(DATABASE_PATH_ENV_VAR);
}

#[test]
#[serial]
fn test_empty_config_env_ignored() {
    let dir = TempDir::new().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());
    env::set_var(CONFIG_ENV_VAR, "");
    env::set_var(DATABASE_PATH_ENV_VAR, "/tmp/fallback.db");

    let config = DatabaseConfig::resolve(None).unwrap();
    assert_eq!(config.path, PathBuf::from("/tmp/fallback.db"));
    assert_eq!(config.pool.max_open_conns, 100);

    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(DATABASE_PATH_ENV_VAR);
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }
}
