use std::sync::Arc;

use crate::config::AdminAllowlist;
use crate::repositories::Repositories;
use crate::store::{KeyNamespace, KeyValueStore};

pub mod catalog_service;
pub mod order_service;
pub mod promo_service;
pub mod settlement;
pub mod stats_service;
pub mod user_service;


pub use catalog_service::CatalogService;
pub use order_service::OrderService;
pub use promo_service::PromoService;
pub use settlement::SettlementEngine;
pub use stats_service::StatsService;
pub use user_service::UserService;

/// Every service of the backend, wired to one store.
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub users: UserService,
    pub promos: PromoService,
    pub stats: StatsService,
    pub store: Arc<dyn KeyValueStore>,
}

impl Services {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: &KeyNamespace, admins: AdminAllowlist) -> Self {
        let repos = Repositories::new(store.clone(), keys, admins);

        let stats = StatsService::new(repos.clone());
        let users = UserService::new(repos.users.clone(), stats.clone());
        let settlement = SettlementEngine::new(repos.clone(), users.clone(), stats.clone());

        Self {
            catalog: CatalogService::new(repos.products.clone(), stats.clone()),
            orders: OrderService::new(repos.orders.clone(), settlement, stats.clone()),
            users,
            promos: PromoService::new(repos.promos.clone()),
            stats,
            store,
        }
    }
}
