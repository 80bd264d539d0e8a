use chrono::Utc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::Stats;
use crate::repositories::{Repositories, Repository};

/// Maintains the store-wide stats snapshot.
///
/// Every recomputation walks all orders, products and user keys; nothing is
/// maintained incrementally.
#[derive(Clone)]
pub struct StatsService {
    repos: Repositories,
}

impl StatsService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Recompute every aggregate and persist the snapshot
    pub async fn recompute(&self) -> Result<Stats, AppError> {
        let orders = self.repos.orders.list().await?;
        let total_revenue = orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .fold(0i64, |sum, o| sum.saturating_add(o.total));

        let stats = Stats {
            total_orders: orders.len() as i64,
            total_products: self.repos.products.count().await? as i64,
            total_users: self.repos.users.count().await? as i64,
            total_revenue,
            updated_at: Utc::now(),
        };

        self.repos.stats.save(&stats).await?;
        debug!(
            "Stats recomputed: {} orders, {} products, {} users, revenue {}",
            stats.total_orders, stats.total_products, stats.total_users, stats.total_revenue
        );
        Ok(stats)
    }

    /// Recompute after a mutation; a failure is logged and otherwise ignored.
    pub async fn refresh(&self) {
        if let Err(e) = self.recompute().await {
            warn!("Failed to refresh stats: {}", e);
        }
    }

    /// Last persisted snapshot, computed on the spot if there is none or it is unreadable
    pub async fn get(&self) -> Result<Stats, AppError> {
        match self.repos.stats.load().await {
            Ok(Some(stats)) => Ok(stats),
            Ok(None) => self.recompute().await,
            Err(e) => {
                warn!("Stored stats unreadable, recomputing: {}", e);
                self.recompute().await
            }
        }
    }
}
