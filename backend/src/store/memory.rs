use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{FieldMap, KeyValueStore};
use crate::error::AppError;

#[derive(Debug, Clone)]
enum Entry {
    Hash(FieldMap),
    Counter(i64),
}

/// In-process [`KeyValueStore`] with the same key semantics as Redis.
///
/// Every operation takes the lock once, so single-key operations are atomic
/// just like on the real server.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn wrong_type(key: &str) -> AppError {
    AppError::Internal(format!(
        "WRONGTYPE operation against key {} holding the wrong kind of value",
        key
    ))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<FieldMap>, AppError> {
        match self.entries.read().await.get(key) {
            Some(Entry::Hash(fields)) => Ok(Some(fields.clone())),
            Some(Entry::Counter(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        match self.entries.read().await.get(key) {
            Some(Entry::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(Entry::Counter(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, fields: &[(String, String)]) -> Result<(), AppError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(FieldMap::new()));
        match entry {
            Entry::Hash(existing) => {
                for (name, value) in fields {
                    existing.insert(name.clone(), value.clone());
                }
                Ok(())
            }
            Entry::Counter(_) => Err(wrong_type(key)),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn increment(&self, counter_key: &str) -> Result<i64, AppError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(counter_key.to_string())
            .or_insert(Entry::Counter(0));
        match entry {
            Entry::Counter(value) => {
                *value += 1;
                Ok(*value)
            }
            Entry::Hash(_) => Err(wrong_type(counter_key)),
        }
    }

    async fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(FieldMap::new()));
        let Entry::Hash(fields) = entry else {
            return Err(wrong_type(key));
        };

        let current = match fields.get(field) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::Internal(format!("hash value of {}.{} is not an integer", key, field))
            })?,
            None => 0,
        };
        let updated = current + delta;
        fields.insert(field.to_string(), updated.to_string());
        Ok(updated)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let pattern = format!("{}:", prefix);
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(&pattern))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_merges_fields() {
        let store = MemoryStore::new();
        store
            .set("shop:products:1", &fields(&[("name", "Mango"), ("stock", "10")]))
            .await
            .unwrap();
        store
            .set("shop:products:1", &fields(&[("stock", "9")]))
            .await
            .unwrap();

        let stored = store.get("shop:products:1").await.unwrap().unwrap();
        assert_eq!(stored["name"], "Mango");
        assert_eq!(stored["stock"], "9");
    }

    #[tokio::test]
    async fn test_counter_is_monotonic() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("shop:orders:counter").await.unwrap(), 1);
        assert_eq!(store.increment("shop:orders:counter").await.unwrap(), 2);
        assert!(store.get("shop:orders:counter").await.is_err());
    }

    #[tokio::test]
    async fn test_increment_field_starts_from_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_field("shop:promos:A", "used", 1).await.unwrap(), 1);
        assert_eq!(store.increment_field("shop:promos:A", "used", 2).await.unwrap(), 3);
        assert_eq!(
            store.get_field("shop:promos:A", "used").await.unwrap().as_deref(),
            Some("3")
        );
    }

    #[tokio::test]
    async fn test_list_keys_includes_counters_and_respects_prefix() {
        let store = MemoryStore::new();
        store.increment("shop:users:counter").await.unwrap();
        store.set("shop:users:5", &fields(&[("id", "5")])).await.unwrap();
        store.set("shop:usersx:5", &fields(&[("id", "5")])).await.unwrap();

        let mut keys = store.list_keys("shop:users").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["shop:users:5", "shop:users:counter"]);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryStore::new();
        store.set("k", &fields(&[("a", "1")])).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(!store.exists("k").await.unwrap());
    }
}
