//! Store configuration
//!
//! Settings come from built-in defaults overlaid with `JOBAGENT_*`
//! environment variables. An env file can pre-populate the environment,
//! either a named one (`--env-file`) or `.env` in the working directory.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;
use jobagent_core_types::Sensitive;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of every environment variable read by the store
pub const ENV_PREFIX: &str = "JOBAGENT";

pub const DEFAULT_DATABASE_PATH: &str = ".jobagent/store.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Runtime configuration for the schema store and its tools
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// How long a connection waits on another writer's lock
    pub busy_timeout_ms: u64,

    /// Logging profile used by binaries
    pub log_profile: Profile,

    /// Base64-encoded 32-byte key sealing external access tokens
    #[serde(default)]
    pub token_key: Option<Sensitive<String>>,
}

impl StoreConfig {
    /// Load configuration from the process environment
    ///
    /// When `env_file` is given it must exist; otherwise a `.env` in the
    /// working directory is loaded if present.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    config_error(format!("Cannot load env file {}: {}", path.display(), e))
                })?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_source(None)
    }

    /// Build configuration from an explicit variable map instead of the
    /// process environment (`None` reads the real environment)
    pub fn from_source(source: Option<config::Map<String, String>>) -> Result<Self> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(source);

        config::Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)
            .and_then(|b| b.set_default("busy_timeout_ms", DEFAULT_BUSY_TIMEOUT_MS))
            .and_then(|b| b.set_default("log_profile", "development"))
            .map_err(|e| config_error(e.to_string()))?
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize::<StoreConfig>())
            .map_err(|e| config_error(e.to_string()))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Token key, or a config error naming the missing variable
    pub fn require_token_key(&self) -> Result<&Sensitive<String>> {
        self.token_key
            .as_ref()
            .ok_or_else(|| config_error(format!("{}_TOKEN_KEY is not set", ENV_PREFIX)))
    }
}

fn config_error(message: String) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(message)
}
