//! Typed records for the storefront
//!
//! Every entity is persisted as a flat hash of strings. Each model implements
//! [`StoredRecord`] to convert between that representation and its typed form;
//! coercion failures surface as [`AppError::Decode`].

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::AppError;
use crate::store::FieldMap;

pub mod order;
pub mod product;
pub mod promo;
pub mod stats;
pub mod user;

pub use order::Order;
pub use product::{NewProduct, Product};
pub use promo::{NewPromo, Promo};
pub use stats::Stats;
pub use user::User;

/// Conversion between a typed record and its stored field map.
pub trait StoredRecord: Sized {
    fn to_fields(&self) -> Vec<(String, String)>;

    fn from_fields(fields: &FieldMap) -> Result<Self, AppError>;
}

pub(crate) fn field(name: &str, value: impl ToString) -> (String, String) {
    (name.to_string(), value.to_string())
}

pub(crate) fn required_str<'a>(fields: &'a FieldMap, name: &str) -> Result<&'a str, AppError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| AppError::Decode(format!("missing field `{}`", name)))
}

pub(crate) fn parse_i64(name: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Decode(format!("field `{}` is not an integer: {:?}", name, raw)))
}

pub(crate) fn required_i64(fields: &FieldMap, name: &str) -> Result<i64, AppError> {
    parse_i64(name, required_str(fields, name)?)
}

pub(crate) fn i64_or(fields: &FieldMap, name: &str, default: i64) -> Result<i64, AppError> {
    match fields.get(name) {
        Some(raw) => parse_i64(name, raw),
        None => Ok(default),
    }
}

pub(crate) fn optional_string(fields: &FieldMap, name: &str) -> Option<String> {
    fields.get(name).cloned()
}

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

/// Accepts RFC 3339 as well as naive ISO-8601 timestamps, the latter read as UTC.
pub(crate) fn parse_timestamp(name: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::Decode(format!("field `{}` is not a timestamp: {:?}", name, raw)))
}

/// `created_at` is mandatory; `updated_at` falls back to it when never written.
pub(crate) fn timestamps(fields: &FieldMap) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let created_at = parse_timestamp("created_at", required_str(fields, "created_at")?)?;
    let updated_at = match fields.get("updated_at") {
        Some(raw) => parse_timestamp("updated_at", raw)?,
        None => created_at,
    };
    Ok((created_at, updated_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn map(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_naive_iso_timestamp() {
        let at = parse_timestamp("created_at", "2024-03-01T12:30:05.123456").unwrap();
        assert_eq!(at.year(), 2024);
        assert_eq!(at.hour(), 12);
        assert_eq!(at.second(), 5);
    }

    #[test]
    fn test_rfc3339_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp("updated_at", &format_timestamp(&now)).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_integer_coercion_errors_name_the_field() {
        let fields = map(&[("price", "cheap")]);
        match required_i64(&fields, "price") {
            Err(AppError::Decode(msg)) => assert!(msg.contains("price")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            required_i64(&fields, "stock"),
            Err(AppError::Decode(_))
        ));
        assert_eq!(i64_or(&fields, "used", 0).unwrap(), 0);
    }

    #[test]
    fn test_updated_at_defaults_to_created_at() {
        let fields = map(&[("created_at", "2024-01-01T00:00:00")]);
        let (created_at, updated_at) = timestamps(&fields).unwrap();
        assert_eq!(created_at, updated_at);
    }
}
