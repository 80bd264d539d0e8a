use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_shared::UpdateProductRequest;

use super::{
    field, format_timestamp, optional_string, required_i64, required_str, timestamps,
    StoredRecord,
};
use crate::error::AppError;
use crate::store::FieldMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Minor currency units.
    pub price: i64,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product that has not been given an id yet.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub stock: i64,
    pub description: Option<String>,
    pub emoji: Option<String>,
}

impl NewProduct {
    pub fn into_product(self, id: i64, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            description: self.description,
            emoji: self.emoji,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Product {
    pub fn apply_update(&mut self, update: UpdateProductRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.emoji.is_some() {
            self.emoji = update.emoji;
        }
    }
}

impl StoredRecord for Product {
    fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            field("id", self.id),
            field("name", &self.name),
            field("category", &self.category),
            field("price", self.price),
            field("stock", self.stock),
            field("created_at", format_timestamp(&self.created_at)),
            field("updated_at", format_timestamp(&self.updated_at)),
        ];
        if let Some(description) = &self.description {
            fields.push(field("description", description));
        }
        if let Some(emoji) = &self.emoji {
            fields.push(field("emoji", emoji));
        }
        fields
    }

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError> {
        let (created_at, updated_at) = timestamps(fields)?;
        Ok(Self {
            id: required_i64(fields, "id")?,
            name: required_str(fields, "name")?.to_string(),
            category: required_str(fields, "category")?.to_string(),
            price: required_i64(fields, "price")?,
            stock: required_i64(fields, "stock")?,
            description: optional_string(fields, "description"),
            emoji: optional_string(fields, "emoji"),
            created_at,
            updated_at,
        })
    }
}
