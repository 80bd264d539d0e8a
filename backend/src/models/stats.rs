use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{field, format_timestamp, i64_or, parse_timestamp, required_str, StoredRecord};
use crate::error::AppError;
use crate::store::FieldMap;

/// Store-wide aggregates, recomputed from scratch after mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_orders: i64,
    pub total_products: i64,
    pub total_users: i64,
    pub total_revenue: i64,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord for Stats {
    fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            field("total_orders", self.total_orders),
            field("total_products", self.total_products),
            field("total_users", self.total_users),
            field("total_revenue", self.total_revenue),
            field("updated_at", format_timestamp(&self.updated_at)),
        ]
    }

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError> {
        Ok(Self {
            total_orders: i64_or(fields, "total_orders", 0)?,
            total_products: i64_or(fields, "total_products", 0)?,
            total_users: i64_or(fields, "total_users", 0)?,
            total_revenue: i64_or(fields, "total_revenue", 0)?,
            updated_at: parse_timestamp("updated_at", required_str(fields, "updated_at")?)?,
        })
    }
}
