//! Containerised Redis for SysDB integration tests

use std::time::Duration;

use redis::{AsyncCommands, Client};
use sysdb_common::{DatabaseConfig, RedisStore, SysdbResult};
use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage,
};

/// Redis test environment with a running container
///
/// The container is stopped and removed when this value is dropped.
pub struct RedisTestEnv {
    _container: testcontainers::ContainerAsync<GenericImage>,
    pub client: Client,
    pub host: String,
    pub port: u16,
}

impl RedisTestEnv {
    /// Start a new Redis container
    ///
    /// # Errors
    /// Returns error if the container fails to start or the client cannot
    /// be created
    pub async fn start() -> anyhow::Result<Self> {
        let container = GenericImage::new("redis", "7-alpine")
            .with_exposed_port(ContainerPort::Tcp(6379))
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(6379).await?;

        let client = Client::open(format!("redis://{}:{}", host, port).as_str())?;

        for _ in 0..5 {
            match client.get_connection_with_timeout(Duration::from_secs(1)) {
                Ok(_) => break,
                Err(_) => tokio::time::sleep(Duration::from_millis(200)).await,
            }
        }

        Ok(Self {
            _container: container,
            client,
            host,
            port,
        })
    }

    /// Connection settings pointing at this container
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            redis_host: self.host.clone(),
            redis_port: self.port,
            db_number: 0,
        }
    }

    /// Connect a `RedisStore` to this container
    pub async fn store(&self) -> SysdbResult<RedisStore> {
        RedisStore::connect(self.database_config()).await
    }

    /// Get a raw value, bypassing `RedisStore`
    pub async fn get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    /// Set a raw value, bypassing `RedisStore`
    pub async fn set(&self, key: &str, value: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set(key, value).await
    }

    /// Set raw bytes, which need not be valid UTF-8
    pub async fn set_bytes(&self, key: &str, value: &[u8]) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set(key, value).await
    }

    /// Set a hash field, giving the key a non-string type
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.hset(key, field, value).await
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.exists(key).await
    }
}
