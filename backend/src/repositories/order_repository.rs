use chrono::Utc;
use std::sync::Arc;
use storefront_shared::OrderStatus;

use super::{load_all, load_one, Repository};
use crate::error::AppError;
use crate::models::{format_timestamp, Order, StoredRecord};
use crate::store::{Collection, KeyValueStore};

#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn KeyValueStore>,
    keys: Collection,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Collection) -> Self {
        Self { store, keys }
    }

    /// Reserves the next order id.
    pub async fn next_id(&self) -> Result<i64, AppError> {
        self.store.increment(&self.keys.counter()).await
    }

    /// Writes an order exactly as given, timestamps included.
    pub async fn insert(&self, order: &Order) -> Result<(), AppError> {
        self.store
            .set(&self.keys.record(order.id), &order.to_fields())
            .await
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .collect())
    }

    /// Sets the status of an existing order. Returns `false` when there is no such order.
    pub async fn update_status(&self, id: i64, status: &OrderStatus) -> Result<bool, AppError> {
        let key = self.keys.record(id);
        if !self.store.exists(&key).await? {
            return Ok(false);
        }
        self.store
            .set(
                &key,
                &[
                    ("status".to_string(), status.to_string()),
                    ("updated_at".to_string(), format_timestamp(&Utc::now())),
                ],
            )
            .await?;
        Ok(true)
    }
}

impl Repository for OrderRepository {
    type Entity = Order;
    type Id = i64;

    /// Orders ordered by id, newest first
    async fn list(&self) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = load_all(self.store.as_ref(), &self.keys).await?;
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(orders)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        load_one(self.store.as_ref(), &self.keys.record(id)).await
    }

    async fn save(&self, mut order: Order) -> Result<Order, AppError> {
        order.updated_at = Utc::now();
        self.insert(&order).await?;
        Ok(order)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.store.delete(&self.keys.record(id)).await
    }
}
