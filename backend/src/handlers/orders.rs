use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::Order;
use crate::services::OrderService;
use storefront_shared::{CreateOrderRequest, SuccessResponse, UpdateOrderStatusRequest};

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

/// All orders, newest first
#[actix_web::get("")]
pub async fn list_orders(orders: web::Data<OrderService>) -> Result<HttpResponse, AppError> {
    let orders = orders.list_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// Settle a draft order
#[actix_web::post("")]
pub async fn create_order(
    request: web::Json<CreateOrderRequest>,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let order = orders.create_order(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse {
        success: true,
        order,
    }))
}

#[actix_web::get("/{user_id}")]
pub async fn list_user_orders(
    path: web::Path<i64>,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let orders = orders.list_user_orders(user_id).await?;
    debug!("User {} has {} orders", user_id, orders.len());
    Ok(HttpResponse::Ok().json(orders))
}

#[actix_web::put("/{order_id}/status")]
pub async fn update_order_status(
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
    orders: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    orders
        .update_status(path.into_inner(), request.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
