use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{field, format_timestamp, i64_or, required_i64, required_str, timestamps, StoredRecord};
use crate::error::AppError;
use crate::store::FieldMap;

/// Percentage discount code with a usage cap. Keyed by `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    pub code: String,
    pub discount: i64,
    pub uses: i64,
    pub used: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPromo {
    pub code: String,
    pub discount: i64,
    pub uses: i64,
    pub used: i64,
}

impl NewPromo {
    pub fn into_promo(self, now: DateTime<Utc>) -> Promo {
        Promo {
            code: self.code,
            discount: self.discount,
            uses: self.uses,
            used: self.used,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Promo {
    pub fn has_uses_left(&self) -> bool {
        self.used < self.uses
    }

    /// `total` reduced by this promo's percentage, rounded down and never below zero.
    ///
    /// The percentage is clamped to `0..=100`, so the result never exceeds `total`.
    pub fn discounted(&self, total: i64) -> i64 {
        let kept = i128::from(100 - self.discount.clamp(0, 100));
        let reduced = (i128::from(total) * kept).div_euclid(100).max(0);
        i64::try_from(reduced).unwrap_or(i64::MAX)
    }
}

impl StoredRecord for Promo {
    fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            field("code", &self.code),
            field("discount", self.discount),
            field("uses", self.uses),
            field("used", self.used),
            field("created_at", format_timestamp(&self.created_at)),
            field("updated_at", format_timestamp(&self.updated_at)),
        ]
    }

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError> {
        let (created_at, updated_at) = timestamps(fields)?;
        Ok(Self {
            code: required_str(fields, "code")?.to_string(),
            discount: required_i64(fields, "discount")?,
            uses: required_i64(fields, "uses")?,
            used: i64_or(fields, "used", 0)?,
            created_at,
            updated_at,
        })
    }
}
