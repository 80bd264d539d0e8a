//! HTTP routes of the storefront API

use actix_web::web;

use crate::error::AppError;
use crate::services::Services;

pub mod admin;
pub mod health;
pub mod orders;
pub mod products;
pub mod promos;
pub mod stats;
pub mod users;


/// Register shared state and every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig, services: &Services) {
    cfg.app_data(web::Data::new(services.catalog.clone()))
        .app_data(web::Data::new(services.orders.clone()))
        .app_data(web::Data::new(services.users.clone()))
        .app_data(web::Data::new(services.promos.clone()))
        .app_data(web::Data::new(services.stats.clone()))
        .app_data(web::Data::new(services.store.clone()))
        .app_data(json_config())
        .service(health::health_check)
        .service(
            web::scope("/api")
                .service(
                    web::scope("/products")
                        .service(products::list_products)
                        .service(products::create_product)
                        .service(products::update_product)
                        .service(products::delete_product),
                )
                .service(
                    web::scope("/orders")
                        .service(orders::list_orders)
                        .service(orders::create_order)
                        .service(orders::list_user_orders)
                        .service(orders::update_order_status),
                )
                .service(
                    web::scope("/users")
                        .service(users::get_user)
                        .service(users::update_user),
                )
                .service(
                    web::scope("/promos")
                        .service(promos::list_promos)
                        .service(promos::create_promo)
                        .service(promos::apply_promo)
                        .service(promos::delete_promo),
                )
                .service(stats::get_stats)
                .service(admin::check_admin),
        );
}

/// Malformed or missing JSON bodies are reported like any other bad input.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    })
}
