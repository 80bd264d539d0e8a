use actix_web::{get, web, HttpResponse, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::store::KeyValueStore;

#[get("/health")]
pub async fn health_check(store: web::Data<Arc<dyn KeyValueStore>>) -> Result<HttpResponse> {
    let store_status = match store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Health check could not reach the store: {}", e);
            "unreachable"
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "storefront-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_status
    })))
}
