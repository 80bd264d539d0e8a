use serde::{Deserialize, Serialize};
use std::fmt;

// Order-related enums
/// Lifecycle status of an order.
///
/// The set is open: statuses written by other clients are kept verbatim in
/// `Other` instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(status) => status,
        }
    }

    /// Only completed orders count towards revenue.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => OrderStatus::Pending,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of an order.
///
/// `id` is the product id (`productId` is accepted on input). Any other keys the
/// client sends, such as a display name or unit price, are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(alias = "productId")]
    pub id: i64,
    pub quantity: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OrderItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self {
            id: product_id,
            quantity,
            extra: serde_json::Map::new(),
        }
    }
}
