use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::models::User;
use crate::services::UserService;
use storefront_shared::UpdateUserRequest;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

/// Profile of a user; first-time visitors get a default one
#[actix_web::get("/{user_id}")]
pub async fn get_user(
    path: web::Path<i64>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.get_or_create(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[actix_web::put("/{user_id}")]
pub async fn update_user(
    path: web::Path<i64>,
    request: web::Json<UpdateUserRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users
        .update_user(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        success: true,
        user,
    }))
}
