use actix_cors::Cors;
use actix_web::{App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod handlers;
mod models;
mod repositories;
mod services;
mod store;
mod utils;

use config::AppConfig;
use error::AppError;
use services::Services;
use store::{KeyNamespace, KeyValueStore, RedisStore};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    let admins = config.admin_allowlist()?;
    info!(
        "Starting storefront backend on {}:{} ({} admin ids)",
        config.host,
        config.port,
        admins.len()
    );

    // Connect to the store
    let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let keys = KeyNamespace::new(&config.key_prefix);

    // Initialize services
    let services = Services::new(store, &keys, admins);

    if config.seed_sample_data {
        services.catalog.seed_sample_products().await?;
    }
    services.stats.refresh().await;

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .configure(|cfg| handlers::configure(cfg, &services))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
    .map_err(AppError::from)
}
