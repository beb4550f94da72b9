//! Redis-backed SysDb.
//!
//! Values are plain Redis strings holding JSON. Keys are enumerated with a
//! cursor-driven `SCAN` rather than `KEYS` so large databases are walked in
//! small batches.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RedisError};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{SysdbError, SysdbResult};
use crate::store::SysDb;

/// Keys requested per `SCAN` round trip.
pub const SCAN_BATCH: usize = 10;

/// SysDb over a Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    config: DatabaseConfig,
    connection: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.config.url())
            .finish()
    }
}

impl RedisStore {
    /// Connects to the Redis instance described by `config`.
    ///
    /// Fails with [`SysdbError::StoreUnavailable`] if the server cannot be
    /// reached.
    pub async fn connect(config: DatabaseConfig) -> SysdbResult<Self> {
        let url = config.url();

        let client = redis::Client::open(url.as_str())
            .map_err(|e| SysdbError::unavailable("connect", format!("{}: {}", url, e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| SysdbError::unavailable("connect", format!("{}: {}", url, e)))?;

        info!("Connected to SysDB at {}", url);
        Ok(Self { config, connection })
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// Maps a failed `GET` to an error.
///
/// A value that exists but is not a UTF-8 string (binary bytes, or a hash or
/// list answered with `WRONGTYPE`) is a problem with that one key, not with
/// the store.
fn get_error(key: &str, e: RedisError) -> SysdbError {
    if e.kind() == ErrorKind::TypeError || e.code() == Some("WRONGTYPE") {
        SysdbError::malformed_record(key, e)
    } else {
        SysdbError::unavailable("get", e)
    }
}

#[async_trait]
impl SysDb for RedisStore {
    async fn get(&self, key: &str) -> SysdbResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| get_error(key, e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> SysdbResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| SysdbError::unavailable("set", e))?;
        Ok(())
    }

    async fn scan(&self, pattern: &str) -> SysdbResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| SysdbError::unavailable("scan", e))?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once across batches.
        keys.sort_unstable();
        keys.dedup();

        debug!("Scanned {} keys matching {}", keys.len(), pattern);
        Ok(keys)
    }
}
