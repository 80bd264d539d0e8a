use tracing::{info, warn};
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewProduct, Product};
use crate::repositories::{ProductRepository, Repository};
use crate::services::stats_service::StatsService;
use crate::utils::validation::{require, validation_errors_to_app_error};
use storefront_shared::{CreateProductRequest, UpdateProductRequest, ERROR_PRODUCT_NOT_FOUND};

/// Product catalog management
#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    stats: StatsService,
}

impl CatalogService {
    pub fn new(products: ProductRepository, stats: StatsService) -> Self {
        Self { products, stats }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.products.list().await
    }

    /// Create a product; name, category, price and stock are required
    pub async fn create_product(&self, request: CreateProductRequest) -> Result<Product, AppError> {
        let new_product = NewProduct {
            name: require(request.name.clone(), "name")?,
            category: require(request.category.clone(), "category")?,
            price: require(request.price, "price")?,
            stock: require(request.stock, "stock")?,
            description: request.description.clone(),
            emoji: request.emoji.clone(),
        };
        request.validate().map_err(validation_errors_to_app_error)?;

        let product = self.products.create(new_product).await?;
        info!("Created product {} '{}'", product.id, product.name);

        self.stats.refresh().await;
        Ok(product)
    }

    /// Merge the provided fields into an existing product
    pub async fn update_product(
        &self,
        product_id: i64,
        request: UpdateProductRequest,
    ) -> Result<Product, AppError> {
        request.validate().map_err(validation_errors_to_app_error)?;

        let mut product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_PRODUCT_NOT_FOUND.to_string()))?;
        product.apply_update(request);

        let product = self.products.save(product).await?;
        info!("Updated product {}", product.id);

        self.stats.refresh().await;
        Ok(product)
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<(), AppError> {
        if !self.products.delete(product_id).await? {
            return Err(AppError::NotFound(ERROR_PRODUCT_NOT_FOUND.to_string()));
        }
        info!("Deleted product {}", product_id);

        self.stats.refresh().await;
        Ok(())
    }

    /// Fill an empty catalog with the starter assortment
    pub async fn seed_sample_products(&self) -> Result<usize, AppError> {
        if self.products.count().await? > 0 {
            return Ok(0);
        }

        let samples = sample_products();
        let count = samples.len();
        for sample in samples {
            if let Err(e) = self.products.create(sample).await {
                warn!("Failed to seed sample product: {}", e);
                return Err(e);
            }
        }
        info!("Seeded {} sample products", count);

        self.stats.refresh().await;
        Ok(count)
    }
}

fn sample_products() -> Vec<NewProduct> {
    [
        ("Mango Liquid", "liquids", 450, 10, "Juicy mango flavour", "🥭"),
        ("JUUL Cartridge", "cartridges", 300, 20, "Original cartridges", "💨"),
        ("RELX Mint Pod", "pods", 280, 12, "Fresh mint flavour", "🔥"),
        ("Vaporesso XROS 3", "devices", 2800, 5, "Compact pod system", "⚡"),
    ]
    .into_iter()
    .map(|(name, category, price, stock, description, emoji)| NewProduct {
        name: name.to_string(),
        category: category.to_string(),
        price,
        stock,
        description: Some(description.to_string()),
        emoji: Some(emoji.to_string()),
    })
    .collect()
}
