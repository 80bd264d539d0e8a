//! Key-value store adapter
//!
//! All entity state lives behind [`KeyValueStore`]: flat string-keyed hashes per
//! record plus integer counters used to hand out ids. Single-key operations are
//! atomic; nothing spanning several keys is.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::AppError;

pub mod keys;
pub mod memory;
pub mod redis_store;

pub use keys::{Collection, KeyNamespace};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// A stored record: field name to raw string value.
pub type FieldMap = HashMap<String, String>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Every field of the hash at `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<FieldMap>, AppError>;

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, AppError>;

    /// Merges `fields` into the hash at `key`, creating it if needed.
    async fn set(&self, key: &str, fields: &[(String, String)]) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Atomically bumps the counter at `counter_key` and returns the new value.
    async fn increment(&self, counter_key: &str) -> Result<i64, AppError>;

    /// Atomically adds `delta` to one hash field and returns the new value.
    async fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError>;

    /// All keys under `prefix:`, counters included.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
