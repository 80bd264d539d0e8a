//! Order settlement
//!
//! Turns a draft order into a persisted one by running a fixed pipeline of
//! steps. Each step may change the running total or a user's bonus, and later
//! steps read what earlier ones wrote, so the order of [`SETTLEMENT_PIPELINE`]
//! is part of the contract.
//!
//! The steps touch several keys without a transaction. Nothing is rolled back:
//! when a step fails, whatever earlier steps wrote stays written. Concurrent
//! settlements may both pass a promo's `used < uses` check or both see a
//! first order for the same referral.

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::error::AppError;
use crate::models::Order;
use crate::repositories::Repositories;
use crate::services::stats_service::StatsService;
use crate::services::user_service::UserService;
use crate::utils::validation::{require, validation_errors_to_app_error};
use storefront_shared::{CreateOrderRequest, OrderItem, OrderStatus, ERROR_ORDER_WITHOUT_ITEMS};

mod steps;

#[cfg(test)]
mod tests;

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop settling and return the error to the caller.
    Abort,
    /// Log the error and run the remaining steps.
    LogAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStep {
    ReferralBonus,
    PromoDiscount,
    BonusRedemption,
    PersistOrder,
    StockDecrement,
    StatsRefresh,
}

pub const SETTLEMENT_PIPELINE: [SettlementStep; 6] = [
    SettlementStep::ReferralBonus,
    SettlementStep::PromoDiscount,
    SettlementStep::BonusRedemption,
    SettlementStep::PersistOrder,
    SettlementStep::StockDecrement,
    SettlementStep::StatsRefresh,
];

impl SettlementStep {
    pub fn name(&self) -> &'static str {
        match self {
            SettlementStep::ReferralBonus => "referral_bonus",
            SettlementStep::PromoDiscount => "promo_discount",
            SettlementStep::BonusRedemption => "bonus_redemption",
            SettlementStep::PersistOrder => "persist_order",
            SettlementStep::StockDecrement => "stock_decrement",
            SettlementStep::StatsRefresh => "stats_refresh",
        }
    }

    /// Steps up to and including persisting the order abort; the ones after it
    /// only log, since the order already exists by then.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            SettlementStep::ReferralBonus
            | SettlementStep::PromoDiscount
            | SettlementStep::BonusRedemption
            | SettlementStep::PersistOrder => FailurePolicy::Abort,
            SettlementStep::StockDecrement | SettlementStep::StatsRefresh => {
                FailurePolicy::LogAndContinue
            }
        }
    }
}

/// A validated order request.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub promo_code: Option<String>,
    pub referral_code: Option<String>,
}

impl TryFrom<CreateOrderRequest> for OrderDraft {
    type Error = AppError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        let user_id = require(request.user_id, "userId")?;
        let items = require(request.items.clone(), "items")?;
        let total = require(request.total, "total")?;

        if items.is_empty() {
            return Err(AppError::Validation(ERROR_ORDER_WITHOUT_ITEMS.to_string()));
        }
        request.validate().map_err(validation_errors_to_app_error)?;
        if let Some(item) = items.iter().find(|item| item.quantity <= 0) {
            return Err(AppError::Validation(format!(
                "items: Quantity of product {} must be positive",
                item.id
            )));
        }

        Ok(Self {
            user_id,
            items,
            total,
            promo_code: request.promo_code.filter(|code| !code.is_empty()),
            referral_code: request.referral_code.filter(|code| !code.is_empty()),
        })
    }
}

/// State threaded through the pipeline.
#[derive(Debug)]
pub struct SettlementContext {
    pub order_id: i64,
    pub draft: OrderDraft,
    /// Running total; starts at the draft total and only ever decreases.
    pub total: i64,
    /// Set once the order has been written.
    pub order: Option<Order>,
}

impl SettlementContext {
    fn new(order_id: i64, draft: OrderDraft) -> Self {
        let total = draft.total;
        Self {
            order_id,
            draft,
            total,
            order: None,
        }
    }

    fn build_order(&self) -> Order {
        let now = Utc::now();
        Order {
            id: self.order_id,
            user_id: self.draft.user_id,
            items: self.draft.items.clone(),
            total: self.total,
            status: OrderStatus::Pending,
            promo_code: self.draft.promo_code.clone(),
            referral_code: self.draft.referral_code.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone)]
pub struct SettlementEngine {
    repos: Repositories,
    users: UserService,
    stats: StatsService,
}

impl SettlementEngine {
    pub fn new(repos: Repositories, users: UserService, stats: StatsService) -> Self {
        Self {
            repos,
            users,
            stats,
        }
    }

    /// Validate `request`, then run every settlement step and return the stored order.
    ///
    /// Validation happens before an id is allocated, so a rejected draft leaves
    /// no trace in the store.
    pub async fn settle(&self, request: CreateOrderRequest) -> Result<Order, AppError> {
        let draft = OrderDraft::try_from(request)?;
        let order_id = self.repos.orders.next_id().await?;
        info!(
            "Settling order {} for user {} ({} items, total {})",
            order_id,
            draft.user_id,
            draft.items.len(),
            draft.total
        );

        let mut ctx = SettlementContext::new(order_id, draft);
        for step in SETTLEMENT_PIPELINE {
            if let Err(e) = self.run_step(step, &mut ctx).await {
                match step.failure_policy() {
                    FailurePolicy::Abort => {
                        error!(
                            "Settlement of order {} aborted at {}: {}",
                            order_id,
                            step.name(),
                            e
                        );
                        return Err(e);
                    }
                    FailurePolicy::LogAndContinue => {
                        warn!(
                            "Step {} of order {} failed, continuing: {}",
                            step.name(),
                            order_id,
                            e
                        );
                    }
                }
            }
        }

        let order = ctx.order.ok_or_else(|| {
            AppError::Internal(format!("order {} finished settlement unsaved", order_id))
        })?;
        info!("Order {} settled with total {}", order.id, order.total);
        Ok(order)
    }

    async fn run_step(
        &self,
        step: SettlementStep,
        ctx: &mut SettlementContext,
    ) -> Result<(), AppError> {
        match step {
            SettlementStep::ReferralBonus => self.apply_referral_bonus(ctx).await,
            SettlementStep::PromoDiscount => self.apply_promo_discount(ctx).await,
            SettlementStep::BonusRedemption => self.redeem_user_bonus(ctx).await,
            SettlementStep::PersistOrder => self.persist_order(ctx).await,
            SettlementStep::StockDecrement => self.decrement_stock(ctx).await,
            SettlementStep::StatsRefresh => self.stats.recompute().await.map(|_| ()),
        }
    }
}
