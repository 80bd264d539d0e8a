use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewPromo, Promo};
use crate::repositories::{PromoRepository, Repository};
use crate::utils::validation::{require, validation_errors_to_app_error};
use storefront_shared::{
    CreatePromoRequest, ERROR_PROMO_CODE_NOT_FOUND, ERROR_PROMO_LIMIT_REACHED, ERROR_PROMO_NOT_FOUND,
};

/// Promo code management and standalone redemption
#[derive(Clone)]
pub struct PromoService {
    promos: PromoRepository,
}

impl PromoService {
    pub fn new(promos: PromoRepository) -> Self {
        Self { promos }
    }

    pub async fn list_promos(&self) -> Result<Vec<Promo>, AppError> {
        self.promos.list().await
    }

    pub async fn create_promo(&self, request: CreatePromoRequest) -> Result<Promo, AppError> {
        let new_promo = NewPromo {
            code: require(request.code.clone(), "code")?,
            discount: require(request.discount, "discount")?,
            uses: require(request.uses, "uses")?,
            used: request.used.unwrap_or(0),
        };
        request.validate().map_err(validation_errors_to_app_error)?;

        let promo = self.promos.create(new_promo).await?;
        info!(
            "Created promo {} ({}% off, {} uses)",
            promo.code, promo.discount, promo.uses
        );
        Ok(promo)
    }

    /// Consume one use of `code` outside of any order and return its discount percentage.
    ///
    /// Independent of the promo step of order settlement: redeeming here and then
    /// ordering with the same code consumes two uses.
    pub async fn apply_promo(&self, code: &str, user_id: i64) -> Result<i64, AppError> {
        let promo = self
            .promos
            .find_by_id(code.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_PROMO_CODE_NOT_FOUND.to_string()))?;

        if !promo.has_uses_left() {
            return Err(AppError::Validation(ERROR_PROMO_LIMIT_REACHED.to_string()));
        }

        let used = self.promos.increment_used(code).await?;
        info!(
            "User {} applied promo {} ({}/{} used)",
            user_id, code, used, promo.uses
        );
        Ok(promo.discount)
    }

    pub async fn delete_promo(&self, code: &str) -> Result<(), AppError> {
        if !self.promos.delete(code.to_string()).await? {
            return Err(AppError::NotFound(ERROR_PROMO_NOT_FOUND.to_string()));
        }
        info!("Deleted promo {}", code);
        Ok(())
    }
}
