use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Promo;
use crate::services::PromoService;
use storefront_shared::{
    promo_applied_message, ApplyPromoRequest, ApplyPromoResponse, CreatePromoRequest,
    SuccessResponse, ERROR_USER_ID_REQUIRED,
};

#[derive(Debug, Serialize)]
pub struct PromoResponse {
    pub success: bool,
    pub promo: Promo,
}

#[actix_web::get("")]
pub async fn list_promos(promos: web::Data<PromoService>) -> Result<HttpResponse, AppError> {
    let promos = promos.list_promos().await?;
    Ok(HttpResponse::Ok().json(promos))
}

#[actix_web::post("")]
pub async fn create_promo(
    request: web::Json<CreatePromoRequest>,
    promos: web::Data<PromoService>,
) -> Result<HttpResponse, AppError> {
    let promo = promos.create_promo(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PromoResponse {
        success: true,
        promo,
    }))
}

/// Redeem one use of a promo code outside of an order
#[actix_web::post("/{code}/apply")]
pub async fn apply_promo(
    path: web::Path<String>,
    request: web::Json<ApplyPromoRequest>,
    promos: web::Data<PromoService>,
) -> Result<HttpResponse, AppError> {
    let user_id = request
        .user_id
        .ok_or_else(|| AppError::Validation(ERROR_USER_ID_REQUIRED.to_string()))?;

    let discount = promos.apply_promo(&path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(ApplyPromoResponse {
        success: true,
        discount,
        message: promo_applied_message(discount),
    }))
}

#[actix_web::delete("/{code}")]
pub async fn delete_promo(
    path: web::Path<String>,
    promos: web::Data<PromoService>,
) -> Result<HttpResponse, AppError> {
    promos.delete_promo(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
