use tracing::{debug, info, warn};

use super::{SettlementContext, SettlementEngine};
use crate::error::AppError;
use crate::repositories::Repository;
use storefront_shared::REFERRAL_BONUS_PERCENT;

/// Bonus credited to both sides of a referral, rounded down.
pub(super) fn referral_bonus(total: i64) -> i64 {
    let bonus = (i128::from(total) * i128::from(REFERRAL_BONUS_PERCENT)).div_euclid(100);
    i64::try_from(bonus.max(0)).unwrap_or(i64::MAX)
}

/// `balance + bonus`, or a validation error when the balance would not fit.
fn credit(balance: i64, bonus: i64, user_id: i64) -> Result<i64, AppError> {
    balance.checked_add(bonus).ok_or_else(|| {
        AppError::Validation(format!("Bonus balance of user {} would overflow", user_id))
    })
}

impl SettlementEngine {
    /// Credit referrer and invited user when this is the invited user's first order.
    ///
    /// "First order" means no order of this user is stored yet; the order being
    /// settled is not written until later in the pipeline.
    pub(super) async fn apply_referral_bonus(
        &self,
        ctx: &mut SettlementContext,
    ) -> Result<(), AppError> {
        let Some(code) = ctx.draft.referral_code.as_deref() else {
            return Ok(());
        };
        let user_id = ctx.draft.user_id;

        let Some(mut referrer) = self.repos.users.find_by_referral_code(code).await? else {
            debug!("Referral code {} matches no user", code);
            return Ok(());
        };

        let prior_orders = self.repos.orders.list_by_user(user_id).await?.len();
        if prior_orders > 0 {
            debug!(
                "User {} already has {} orders, no referral bonus",
                user_id, prior_orders
            );
            return Ok(());
        }

        let bonus = referral_bonus(ctx.total);
        let referrer_id = referrer.id;
        referrer.bonus = credit(referrer.bonus, bonus, referrer_id)?;
        referrer.add_referral(user_id);
        self.repos.users.save(referrer).await?;

        let mut invited = self.users.get_or_create(user_id).await?;
        invited.bonus = credit(invited.bonus, bonus, user_id)?;
        self.repos.users.save(invited).await?;

        info!(
            "Referral bonus of {} credited to referrer {} and user {}",
            bonus, referrer_id, user_id
        );
        Ok(())
    }

    /// Apply the promo percentage if the code exists and has uses left.
    ///
    /// Unknown and exhausted codes are ignored; the order goes through at full price.
    pub(super) async fn apply_promo_discount(
        &self,
        ctx: &mut SettlementContext,
    ) -> Result<(), AppError> {
        let Some(code) = ctx.draft.promo_code.clone() else {
            return Ok(());
        };

        match self.repos.promos.find_by_id(code.clone()).await? {
            Some(promo) if promo.has_uses_left() => {
                let before = ctx.total;
                ctx.total = promo.discounted(ctx.total);
                self.repos.promos.increment_used(&code).await?;
                info!(
                    "Promo {} applied to order {}: {} -> {}",
                    code, ctx.order_id, before, ctx.total
                );
            }
            Some(promo) => debug!(
                "Promo {} exhausted ({}/{}), ignoring",
                code, promo.used, promo.uses
            ),
            None => debug!("Promo {} does not exist, ignoring", code),
        }
        Ok(())
    }

    /// Spend as much of the user's bonus balance as the total allows.
    pub(super) async fn redeem_user_bonus(
        &self,
        ctx: &mut SettlementContext,
    ) -> Result<(), AppError> {
        let Some(mut user) = self.repos.users.find_by_id(ctx.draft.user_id).await? else {
            return Ok(());
        };
        if user.bonus <= 0 {
            return Ok(());
        }

        let redeemed = user.bonus.min(ctx.total);
        ctx.total = (ctx.total - redeemed).max(0);
        user.bonus = (user.bonus - redeemed).max(0);
        let user = self.repos.users.save(user).await?;

        debug!(
            "User {} redeemed {} bonus on order {}, {} left",
            user.id, redeemed, ctx.order_id, user.bonus
        );
        Ok(())
    }

    pub(super) async fn persist_order(&self, ctx: &mut SettlementContext) -> Result<(), AppError> {
        let order = ctx.build_order();
        self.repos.orders.insert(&order).await?;
        ctx.order = Some(order);
        Ok(())
    }

    /// Take each line's quantity out of stock. Products that no longer exist are
    /// skipped; a failing line does not stop the others.
    pub(super) async fn decrement_stock(&self, ctx: &mut SettlementContext) -> Result<(), AppError> {
        let mut first_error = None;

        for item in &ctx.draft.items {
            match self.repos.products.decrement_stock(item.id, item.quantity).await {
                Ok(Some(remaining)) => debug!("Product {} stock now {}", item.id, remaining),
                Ok(None) => debug!("Product {} no longer exists, skipping", item.id),
                Err(e) => {
                    warn!("Could not decrement stock of product {}: {}", item.id, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
