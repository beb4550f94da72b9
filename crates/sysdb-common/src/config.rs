//! Configuration file support.
//!
//! Loads SysDB client settings from a TOML file. Default location:
//! `/etc/minisw/sysdb.toml`. A missing file is not an error; every field
//! falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SysdbError, SysdbResult};
use crate::records::defaults;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/minisw/sysdb.toml";

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Redis host
    #[serde(default = "default_redis_host")]
    pub redis_host: String,

    /// Redis port
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,

    /// Redis database number holding SysDB
    #[serde(default)]
    pub db_number: u32,
}

impl DatabaseConfig {
    /// Returns the Redis connection URL.
    pub fn url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.db_number
        )
    }
}

/// Settings for admin-state writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutatorConfig {
    /// Actor recorded in the `user` field of config records
    #[serde(default = "default_user")]
    pub user: String,
}

/// Complete SysDB client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysdbConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub mutator: MutatorConfig,
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_user() -> String {
    defaults::USER.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            db_number: 0,
        }
    }
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
        }
    }
}

impl SysdbConfig {
    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> SysdbResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content).map_err(|e| SysdbError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                config.validate(path)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(SysdbError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Loads from the default location or defaults.
    pub fn load() -> SysdbResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    fn validate(&self, path: &Path) -> SysdbResult<()> {
        let invalid = |message: &str| SysdbError::Config {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        if self.database.redis_port == 0 {
            return Err(invalid("redis_port must be > 0"));
        }

        if self.database.redis_host.is_empty() {
            return Err(invalid("redis_host must not be empty"));
        }

        if self.mutator.user.is_empty() {
            return Err(invalid("user must not be empty"));
        }

        Ok(())
    }
}
