use actix_web::{web, HttpResponse};
use tracing::debug;

use crate::services::UserService;
use storefront_shared::{CheckAdminQuery, CheckAdminResponse};

/// Whether `tg_id` is on the admin allowlist. A missing or non-numeric id is never an admin.
#[actix_web::get("/check-admin")]
pub async fn check_admin(
    query: web::Query<CheckAdminQuery>,
    users: web::Data<UserService>,
) -> HttpResponse {
    let is_admin = query
        .tg_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(|id| users.is_admin(id))
        .unwrap_or(false);

    debug!("Admin check for {:?}: {}", query.tg_id, is_admin);
    HttpResponse::Ok().json(CheckAdminResponse { is_admin })
}
