use std::sync::Arc;

use super::load_one;
use crate::error::AppError;
use crate::models::{Stats, StoredRecord};
use crate::store::KeyValueStore;

/// Holds the single stats snapshot.
#[derive(Clone)]
pub struct StatsRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: String) -> Self {
        Self { store, key }
    }

    pub async fn load(&self) -> Result<Option<Stats>, AppError> {
        load_one(self.store.as_ref(), &self.key).await
    }

    pub async fn save(&self, stats: &Stats) -> Result<(), AppError> {
        self.store.set(&self.key, &stats.to_fields()).await
    }
}
