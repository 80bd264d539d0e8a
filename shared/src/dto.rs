use crate::types::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Product DTOs
/// Body of `POST /api/products`.
///
/// Required fields are optional here so that a missing one is reported by name
/// instead of as a generic body error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(range(min = 0))]
    pub price: Option<i64>,

    #[validate(range(min = 0))]
    pub stock: Option<i64>,

    pub description: Option<String>,
    pub emoji: Option<String>,
}

/// Body of `PUT /api/products/{id}`; only the present fields are merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(range(min = 0))]
    pub price: Option<i64>,

    #[validate(range(min = 0))]
    pub stock: Option<i64>,

    pub description: Option<String>,
    pub emoji: Option<String>,
}

// Order DTOs
/// Draft order as submitted by the storefront.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Option<i64>,

    pub items: Option<Vec<OrderItem>>,

    #[validate(range(min = 0))]
    pub total: Option<i64>,

    pub promo_code: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<OrderStatus>,
}

// User DTOs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,

    #[validate(range(min = 0))]
    pub bonus: Option<i64>,

    pub referrals: Option<Vec<i64>>,

    #[validate(length(min = 1, max = 32))]
    pub referral_code: Option<String>,
}

// Promo DTOs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePromoRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,

    /// Percentage off, `0..=100`.
    #[validate(range(min = 0, max = 100))]
    pub discount: Option<i64>,

    #[validate(range(min = 0))]
    pub uses: Option<i64>,

    #[validate(range(min = 0))]
    pub used: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPromoRequest {
    pub user_id: Option<i64>,
}

// Admin DTOs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckAdminQuery {
    pub tg_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAdminResponse {
    pub is_admin: bool,
}

// Generic responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPromoResponse {
    pub success: bool,
    pub discount: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_order_request_uses_camel_case() {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "userId": 7,
            "items": [{"id": 1, "quantity": 1}],
            "total": 1000,
            "promoCode": "SAVE10"
        }))
        .unwrap();

        assert_eq!(request.user_id, Some(7));
        assert_eq!(request.promo_code.as_deref(), Some("SAVE10"));
        assert!(request.referral_code.is_none());
    }

    #[test]
    fn test_negative_total_fails_validation() {
        let request = CreateOrderRequest {
            user_id: Some(1),
            items: Some(vec![OrderItem::new(1, 1)]),
            total: Some(-5),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_check_admin_response_shape() {
        let body = serde_json::to_value(CheckAdminResponse { is_admin: true }).unwrap();
        assert_eq!(body, json!({"isAdmin": true}));
    }
}
