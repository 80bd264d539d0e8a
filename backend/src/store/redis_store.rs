use async_trait::async_trait;
use redis::{aio::Connection, AsyncCommands, Client as RedisClient};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{FieldMap, KeyValueStore};
use crate::error::AppError;

/// [`KeyValueStore`] backed by Redis hashes and `INCR` counters.
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Opens a client for `redis_url` and checks that the server answers.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = RedisClient::open(redis_url)?;
        let store = Self::new(client);
        store.ping().await?;
        info!("Connected to Redis");
        Ok(store)
    }

    async fn connection(&self) -> Result<Connection, AppError> {
        Ok(self.client.get_async_connection().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<FieldMap>, AppError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn.hgetall(key).await?;

        // HGETALL answers an empty hash for a missing key.
        if fields.is_empty() {
            debug!("Key {} not found", key);
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, fields: &[(String, String)]) -> Result<(), AppError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = conn.hset_multiple(key, fields).await?;
        debug!("Wrote {} fields to {}", fields.len(), key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let deleted: u64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn increment(&self, counter_key: &str) -> Result<i64, AppError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.incr(counter_key, 1).await?;
        Ok(value)
    }

    async fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.hincr(key, field, delta).await?;
        Ok(value)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = conn.keys(format!("{}:*", prefix)).await?;
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
