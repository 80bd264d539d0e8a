use tracing::info;

use crate::error::AppError;
use crate::models::Order;
use crate::repositories::{OrderRepository, Repository};
use crate::services::settlement::SettlementEngine;
use crate::services::stats_service::StatsService;
use storefront_shared::{CreateOrderRequest, OrderStatus, ERROR_ORDER_NOT_FOUND, ERROR_STATUS_REQUIRED};

/// Order intake and lifecycle
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    settlement: SettlementEngine,
    stats: StatsService,
}

impl OrderService {
    pub fn new(orders: OrderRepository, settlement: SettlementEngine, stats: StatsService) -> Self {
        Self {
            orders,
            settlement,
            stats,
        }
    }

    /// All orders, newest first
    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        self.orders.list().await
    }

    pub async fn list_user_orders(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        self.orders.list_by_user(user_id).await
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, AppError> {
        self.settlement.settle(request).await
    }

    pub async fn update_status(
        &self,
        order_id: i64,
        status: Option<OrderStatus>,
    ) -> Result<(), AppError> {
        let status =
            status.ok_or_else(|| AppError::Validation(ERROR_STATUS_REQUIRED.to_string()))?;

        if !self.orders.update_status(order_id, &status).await? {
            return Err(AppError::NotFound(ERROR_ORDER_NOT_FOUND.to_string()));
        }
        info!("Order {} is now {}", order_id, status);

        self.stats.refresh().await;
        Ok(())
    }
}
