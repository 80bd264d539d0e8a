use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_shared::{default_referral_code, default_username, UpdateUserRequest};

use super::{
    field, format_timestamp, i64_or, required_i64, timestamps, StoredRecord,
};
use crate::error::AppError;
use crate::store::FieldMap;

/// A storefront customer, keyed by their messaging-platform id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub bonus: i64,
    pub referrals: Vec<i64>,
    pub referral_code: String,
    /// Computed from the admin allowlist on read, never stored.
    pub is_admin: bool,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The record a user gets on their first visit.
    pub fn with_defaults(id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: default_username(id),
            bonus: 0,
            referrals: Vec::new(),
            referral_code: default_referral_code(id),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records `invited` as a referral unless already present.
    pub fn add_referral(&mut self, invited: i64) {
        if !self.referrals.contains(&invited) {
            self.referrals.push(invited);
        }
    }

    pub fn apply_update(&mut self, update: UpdateUserRequest) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(bonus) = update.bonus {
            self.bonus = bonus;
        }
        if let Some(referrals) = update.referrals {
            self.referrals = referrals;
        }
        if let Some(code) = update.referral_code {
            self.referral_code = code;
        }
    }
}

impl StoredRecord for User {
    fn to_fields(&self) -> Vec<(String, String)> {
        let referrals =
            serde_json::to_string(&self.referrals).unwrap_or_else(|_| "[]".to_string());
        vec![
            field("id", self.id),
            field("username", &self.username),
            field("bonus", self.bonus),
            field("referrals", referrals),
            field("referralCode", &self.referral_code),
            field("created_at", format_timestamp(&self.created_at)),
            field("updated_at", format_timestamp(&self.updated_at)),
        ]
    }

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError> {
        let id = required_i64(fields, "id")?;
        let referrals = match fields.get("referrals") {
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                AppError::Decode(format!("field `referrals` of user {}: {}", id, e))
            })?,
            None => Vec::new(),
        };
        let (created_at, updated_at) = timestamps(fields)?;

        Ok(Self {
            id,
            username: fields
                .get("username")
                .cloned()
                .unwrap_or_else(|| default_username(id)),
            bonus: i64_or(fields, "bonus", 0)?,
            referrals,
            referral_code: fields
                .get("referralCode")
                .cloned()
                .unwrap_or_else(|| default_referral_code(id)),
            is_admin: false,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_new_user() {
        let user = User::with_defaults(77, Utc::now());
        assert_eq!(user.username, "user_77");
        assert_eq!(user.referral_code, "REF000077");
        assert_eq!(user.bonus, 0);
        assert!(user.referrals.is_empty());
    }

    #[test]
    fn test_is_admin_is_not_stored() {
        let mut user = User::with_defaults(1, Utc::now());
        user.is_admin = true;
        let fields: FieldMap = user.to_fields().into_iter().collect();
        assert!(!fields.contains_key("isAdmin"));
        assert!(!User::from_fields(&fields).unwrap().is_admin);
    }

    #[test]
    fn test_missing_optional_fields_fall_back() {
        let fields: FieldMap = [
            ("id", "5"),
            ("created_at", "2024-05-01T10:00:00"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let user = User::from_fields(&fields).unwrap();
        assert_eq!(user.referral_code, "REF000005");
        assert_eq!(user.bonus, 0);
        assert!(user.referrals.is_empty());
    }

    #[test]
    fn test_add_referral_is_deduplicated() {
        let mut user = User::with_defaults(1, Utc::now());
        user.add_referral(9);
        user.add_referral(9);
        assert_eq!(user.referrals, vec![9]);
    }

    #[test]
    fn test_json_shape() {
        let body = serde_json::to_value(User::with_defaults(3, Utc::now())).unwrap();
        assert_eq!(body["referralCode"], "REF000003");
        assert_eq!(body["isAdmin"], false);
        assert!(body.get("created_at").is_some());
    }
}
