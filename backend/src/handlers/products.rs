use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::Product;
use crate::services::CatalogService;
use storefront_shared::{CreateProductRequest, SuccessResponse, UpdateProductRequest};

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

/// List the whole catalog
#[actix_web::get("")]
pub async fn list_products(
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let products = catalog.list_products().await?;
    debug!("Listing {} products", products.len());
    Ok(HttpResponse::Ok().json(products))
}

#[actix_web::post("")]
pub async fn create_product(
    request: web::Json<CreateProductRequest>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let product = catalog.create_product(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse {
        success: true,
        product,
    }))
}

#[actix_web::put("/{product_id}")]
pub async fn update_product(
    path: web::Path<i64>,
    request: web::Json<UpdateProductRequest>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let product = catalog
        .update_product(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ProductResponse {
        success: true,
        product,
    }))
}

#[actix_web::delete("/{product_id}")]
pub async fn delete_product(
    path: web::Path<i64>,
    catalog: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    catalog.delete_product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
