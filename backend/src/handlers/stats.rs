use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::services::StatsService;

#[actix_web::get("/stats")]
pub async fn get_stats(stats: web::Data<StatsService>) -> Result<HttpResponse, AppError> {
    let snapshot = stats.get().await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
