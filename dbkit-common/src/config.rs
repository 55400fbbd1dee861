//! Configuration loading and resolution
//!
//! Config file resolution priority:
//! 1. Explicit path argument (highest priority)
//! 2. `DBKIT_CONFIG` environment variable
//! 3. `<config_dir>/dbkit/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! After loading, `DBKIT_DATABASE_PATH` overrides the database path. Either
//! variable is ignored with a warning when set but empty.
//!
//! Pool defaults mirror a general-purpose service: at most 100 connections
//! open and at most 10 of them idle, idle connections closed after 5 minutes
//! and every connection recycled after an hour.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "DBKIT_CONFIG";

/// Environment variable overriding the database path
pub const DATABASE_PATH_ENV_VAR: &str = "DBKIT_DATABASE_PATH";

/// Path value selecting a private in-memory database
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Connection settings for the backing store
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file, or `:memory:`
    ///
    /// With `create_if_missing`, missing parent directories are created too.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Create the database file if it does not exist
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,

    /// How long a connection waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Default per-call deadline (none if unset)
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,

    #[serde(default)]
    pub pool: PoolConfig,
}

/// Pool tunables
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Ceiling on idle connections; extras are closed when released
    #[serde(default = "default_max_idle_conns")]
    pub max_idle_conns: u32,

    /// Ceiling on open connections; callers beyond it wait
    #[serde(default = "default_max_open_conns")]
    pub max_open_conns: u32,

    /// Idle connections are closed after this long
    #[serde(default = "default_max_idle_time_secs")]
    pub max_idle_time_secs: u64,

    /// Every connection is closed and replaced after this long
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,

    /// Longest a caller waits for a free connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dbkit").join("dbkit.db"))
        .unwrap_or_else(|| PathBuf::from("./dbkit_data/dbkit.db"))
}

fn default_create_if_missing() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_max_idle_conns() -> u32 {
    10
}

fn default_max_open_conns() -> u32 {
    100
}

fn default_max_idle_time_secs() -> u64 {
    5 * 60
}

fn default_max_lifetime_secs() -> u64 {
    60 * 60
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_conns: default_max_idle_conns(),
            max_open_conns: default_max_open_conns(),
            max_idle_time_secs: default_max_idle_time_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl PoolConfig {
    pub fn max_idle_time(&self) -> Duration {
        Duration::from_secs(self.max_idle_time_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            create_if_missing: default_create_if_missing(),
            busy_timeout_ms: default_busy_timeout_ms(),
            statement_timeout_ms: None,
            pool: PoolConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Config for a database file with default pool settings
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Config for a private in-memory database
    pub fn in_memory() -> Self {
        Self::for_path(IN_MEMORY_PATH)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == Path::new(IN_MEMORY_PATH)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    /// Parse a TOML document
    ///
    /// Accepts either a bare document or one nested under `[database]`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;

        let section = match value.get("database") {
            Some(section) => section.clone(),
            None => value,
        };

        section
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(format!("Invalid database config: {}", e)))
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded database config from {}", path.display());
        Ok(config)
    }

    /// Resolve config following the priority order in the module docs
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        // Priority 1: explicit path, must exist
        if let Some(path) = explicit {
            return Ok(Self::load(path)?.with_env_overrides());
        }

        // Priority 2: environment variable, must exist if set
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if path.trim().is_empty() {
                warn!("{} is set but empty, ignoring", CONFIG_ENV_VAR);
            } else {
                return Ok(Self::load(Path::new(&path))?.with_env_overrides());
            }
        }

        // Priority 3: user config directory
        if let Some(path) = user_config_file() {
            if path.exists() {
                return Ok(Self::load(&path)?.with_env_overrides());
            }
        }

        // Priority 4: compiled defaults
        debug!("No database config file found, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    /// Apply `DBKIT_DATABASE_PATH` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV_VAR) {
            if path.trim().is_empty() {
                warn!("{} is set but empty, ignoring", DATABASE_PATH_ENV_VAR);
            } else {
                self.path = PathBuf::from(path);
            }
        }
        self
    }

    /// Check settings that would make the pool unusable
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("database path is empty".to_string()));
        }
        let pool = &self.pool;
        if pool.max_open_conns == 0 {
            return Err(Error::InvalidConfig(
                "max_open_conns must be at least 1".to_string(),
            ));
        }
        if pool.max_idle_conns > pool.max_open_conns {
            return Err(Error::InvalidConfig(format!(
                "max_idle_conns ({}) exceeds max_open_conns ({})",
                pool.max_idle_conns, pool.max_open_conns
            )));
        }
        if pool.max_idle_time_secs == 0 || pool.max_lifetime_secs == 0 {
            return Err(Error::InvalidConfig(
                "max_idle_time_secs and max_lifetime_secs must be non-zero".to_string(),
            ));
        }
        if pool.acquire_timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "acquire_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.statement_timeout_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "statement_timeout_ms must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dbkit").join("config.toml"))
}
