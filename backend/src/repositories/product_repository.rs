use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::{load_all, load_one, Repository};
use crate::error::AppError;
use crate::models::{parse_i64, NewProduct, Product, StoredRecord};
use crate::store::{Collection, KeyValueStore};

#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn KeyValueStore>,
    keys: Collection,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Collection) -> Self {
        Self { store, keys }
    }

    /// Allocates an id and stores a brand-new product
    pub async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let id = self.store.increment(&self.keys.counter()).await?;
        let product = product.into_product(id, Utc::now());
        self.store
            .set(&self.keys.record(id), &product.to_fields())
            .await?;
        debug!("Created product {} ({})", id, product.name);
        Ok(product)
    }

    /// Lowers the stock of a product by `quantity`, never below zero.
    ///
    /// Returns the new stock, or `None` when the product no longer exists.
    pub async fn decrement_stock(&self, id: i64, quantity: i64) -> Result<Option<i64>, AppError> {
        let key = self.keys.record(id);
        if !self.store.exists(&key).await? {
            return Ok(None);
        }

        let current = match self.store.get_field(&key, "stock").await? {
            Some(raw) => parse_i64("stock", &raw)?,
            None => 0,
        };
        let remaining = (current - quantity).max(0);
        self.store
            .set(&key, &[("stock".to_string(), remaining.to_string())])
            .await?;
        Ok(Some(remaining))
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        Ok(self.list().await?.len())
    }
}

impl Repository for ProductRepository {
    type Entity = Product;
    type Id = i64;

    /// Products ordered by id, oldest first
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let mut products: Vec<Product> = load_all(self.store.as_ref(), &self.keys).await?;
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        load_one(self.store.as_ref(), &self.keys.record(id)).await
    }

    async fn save(&self, mut product: Product) -> Result<Product, AppError> {
        product.updated_at = Utc::now();
        self.store
            .set(&self.keys.record(product.id), &product.to_fields())
            .await?;
        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.store.delete(&self.keys.record(id)).await
    }
}
