//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Running-ledger engine limits.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Running-ledger engine limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on the rows a single account may hold before a recompute
    /// is refused.
    #[serde(default = "default_max_rows_per_account")]
    pub max_rows_per_account: usize,
    /// How long a mutation waits for the per-account lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_max_rows_per_account() -> usize {
    50_000
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_rows_per_account: default_max_rows_per_account(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl LedgerConfig {
    /// Returns the lock timeout as a `Duration`.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COMPTOIR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
