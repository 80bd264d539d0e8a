//! Repository pattern implementation over the key-value store
//!
//! Each repository owns one key collection and the conversion between stored
//! hashes and typed records. Listing is lenient (a malformed record is logged
//! and skipped); single-record access is strict and propagates decode errors.

use std::sync::Arc;
use tracing::warn;

use crate::config::AdminAllowlist;
use crate::error::AppError;
use crate::models::StoredRecord;
use crate::store::{Collection, KeyNamespace, KeyValueStore};

pub mod order_repository;
pub mod product_repository;
pub mod promo_repository;
pub mod stats_repository;
pub mod user_repository;

pub use order_repository::OrderRepository;
pub use product_repository::ProductRepository;
pub use promo_repository::PromoRepository;
pub use stats_repository::StatsRepository;
pub use user_repository::UserRepository;

/// Repository container that holds all repositories
#[derive(Clone)]
pub struct Repositories {
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub users: UserRepository,
    pub promos: PromoRepository,
    pub stats: StatsRepository,
}

impl Repositories {
    /// Create a new repository container
    pub fn new(store: Arc<dyn KeyValueStore>, keys: &KeyNamespace, admins: AdminAllowlist) -> Self {
        Self {
            products: ProductRepository::new(store.clone(), keys.products()),
            orders: OrderRepository::new(store.clone(), keys.orders()),
            users: UserRepository::new(store.clone(), keys.users(), admins),
            promos: PromoRepository::new(store.clone(), keys.promos()),
            stats: StatsRepository::new(store, keys.stats()),
        }
    }
}

/// Base repository trait that all repositories implement
#[allow(async_fn_in_trait)]
pub trait Repository {
    type Entity;
    type Id;

    /// All records, in the repository's listing order
    async fn list(&self) -> Result<Vec<Self::Entity>, AppError>;

    /// Find entity by ID
    async fn find_by_id(&self, id: Self::Id) -> Result<Option<Self::Entity>, AppError>;

    /// Persist an entity, refreshing its `updated_at`
    async fn save(&self, entity: Self::Entity) -> Result<Self::Entity, AppError>;

    /// Delete an entity
    async fn delete(&self, id: Self::Id) -> Result<bool, AppError>;
}

/// Loads every record of `collection`, skipping the counter and any record that
/// fails to decode.
pub(crate) async fn load_all<T: StoredRecord>(
    store: &dyn KeyValueStore,
    collection: &Collection,
) -> Result<Vec<T>, AppError> {
    let keys = store.list_keys(collection.prefix()).await?;
    let mut records = Vec::with_capacity(keys.len());

    for key in keys.iter().filter(|k| !collection.is_counter(k)) {
        let Some(fields) = store.get(key).await? else {
            continue;
        };
        match T::from_fields(&fields) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable record {}: {}", key, e),
        }
    }

    Ok(records)
}

/// Loads one record; a record that fails to decode is an error.
pub(crate) async fn load_one<T: StoredRecord>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    match store.get(key).await? {
        Some(fields) => T::from_fields(&fields).map(Some),
        None => Ok(None),
    }
}
