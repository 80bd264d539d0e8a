use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_shared::{OrderItem, OrderStatus};
use tracing::warn;

use super::{
    field, format_timestamp, optional_string, required_i64, timestamps, StoredRecord,
};
use crate::error::AppError;
use crate::store::FieldMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub status: OrderStatus,
    #[serde(rename = "promoCode", skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(rename = "referralCode", skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord for Order {
    fn to_fields(&self) -> Vec<(String, String)> {
        // Serializing plain ids, integers and string maps cannot fail.
        let items = serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string());
        let mut fields = vec![
            field("id", self.id),
            field("userId", self.user_id),
            field("items", items),
            field("total", self.total),
            field("status", &self.status),
            field("created_at", format_timestamp(&self.created_at)),
            field("updated_at", format_timestamp(&self.updated_at)),
        ];
        if let Some(code) = &self.promo_code {
            fields.push(field("promoCode", code));
        }
        if let Some(code) = &self.referral_code {
            fields.push(field("referralCode", code));
        }
        fields
    }

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError> {
        let id = required_i64(fields, "id")?;
        let items = match fields.get("items") {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Order {} has unreadable items, treating as empty: {}", id, e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        let (created_at, updated_at) = timestamps(fields)?;

        Ok(Self {
            id,
            user_id: required_i64(fields, "userId")?,
            items,
            total: required_i64(fields, "total")?,
            status: fields
                .get("status")
                .map(|s| OrderStatus::from(s.as_str()))
                .unwrap_or_default(),
            promo_code: optional_string(fields, "promoCode"),
            referral_code: optional_string(fields, "referralCode"),
            created_at,
            updated_at,
        })
    }
}
