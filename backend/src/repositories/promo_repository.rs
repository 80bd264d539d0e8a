use chrono::Utc;
use std::sync::Arc;
use storefront_shared::ERROR_PROMO_EXISTS;

use super::{load_all, load_one, Repository};
use crate::error::AppError;
use crate::models::{NewPromo, Promo, StoredRecord};
use crate::store::{Collection, KeyValueStore};

#[derive(Clone)]
pub struct PromoRepository {
    store: Arc<dyn KeyValueStore>,
    keys: Collection,
}

impl PromoRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Collection) -> Self {
        Self { store, keys }
    }

    pub async fn create(&self, promo: NewPromo) -> Result<Promo, AppError> {
        self.save(promo.into_promo(Utc::now())).await
    }

    pub async fn exists(&self, code: &str) -> Result<bool, AppError> {
        self.store.exists(&self.keys.record(code)).await
    }

    /// Consumes one use of `code`, returning the new `used` count.
    pub async fn increment_used(&self, code: &str) -> Result<i64, AppError> {
        self.store
            .increment_field(&self.keys.record(code), "used", 1)
            .await
    }
}

impl Repository for PromoRepository {
    type Entity = Promo;
    type Id = String;

    /// Promos ordered by creation time
    async fn list(&self) -> Result<Vec<Promo>, AppError> {
        let mut promos: Vec<Promo> = load_all(self.store.as_ref(), &self.keys).await?;
        promos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.code.cmp(&b.code)));
        Ok(promos)
    }

    async fn find_by_id(&self, code: String) -> Result<Option<Promo>, AppError> {
        load_one(self.store.as_ref(), &self.keys.record(&code)).await
    }

    /// Stores a new promo. Codes are write-once: an existing code is a conflict.
    ///
    /// The existence probe and the write are separate store calls, so two
    /// concurrent creations of one code can both pass the check.
    async fn save(&self, mut promo: Promo) -> Result<Promo, AppError> {
        if self.exists(&promo.code).await? {
            return Err(AppError::Conflict(ERROR_PROMO_EXISTS.to_string()));
        }
        promo.updated_at = Utc::now();
        self.store
            .set(&self.keys.record(&promo.code), &promo.to_fields())
            .await?;
        Ok(promo)
    }

    async fn delete(&self, code: String) -> Result<bool, AppError> {
        self.store.delete(&self.keys.record(&code)).await
    }
}
