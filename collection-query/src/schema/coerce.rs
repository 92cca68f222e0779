//! Coercion of raw query-string values into typed [`Value`]s
//!
//! A failed coercion is never fatal to a query: callers drop the filter (or
//! the single `in` token) that carried the bad value.
//!
//! # Example
//!
//! ```rust
//! use collection_query::schema::{coerce, FieldType, Value, ValueKind};
//!
//! let n = coerce("42", FieldType::required(ValueKind::Integer)).unwrap();
//! assert_eq!(n, Value::Integer(42));
//!
//! assert!(coerce("42abc", FieldType::required(ValueKind::Integer)).is_err());
//! assert_eq!(
//!     coerce("null", FieldType::nullable(ValueKind::Integer)).unwrap(),
//!     Value::Null,
//! );
//! ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::value::{FieldType, Value, ValueKind};

/// Naive timestamp layouts accepted after RFC 3339, all read as UTC
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A raw value could not be parsed into the target kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot coerce {raw:?} into {kind}: {reason}")]
pub struct CoercionError {
    /// The raw input
    pub raw: String,
    /// The kind that was requested
    pub kind: ValueKind,
    /// Parser message
    pub reason: String,
}

impl CoercionError {
    fn new(raw: &str, kind: ValueKind, reason: impl ToString) -> Self {
        Self {
            raw: raw.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Coerce `raw` into a value of the declared `field_type`
///
/// Text is taken verbatim. Every other kind must consume the whole
/// (whitespace-trimmed) input. The literal `null` is accepted for nullable
/// types only.
pub fn coerce(raw: &str, field_type: FieldType) -> Result<Value, CoercionError> {
    if field_type.nullable && raw.trim().eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }

    let kind = field_type.kind;
    if kind == ValueKind::Text {
        return Ok(Value::Text(raw.to_string()));
    }

    let input = raw.trim();
    match kind {
        ValueKind::Uuid => Uuid::parse_str(input)
            .map(Value::Uuid)
            .map_err(|e| CoercionError::new(raw, kind, e)),
        ValueKind::Timestamp => parse_timestamp(input)
            .map(Value::Timestamp)
            .ok_or_else(|| CoercionError::new(raw, kind, "not an ISO-8601 timestamp")),
        ValueKind::Boolean => parse_bool(input)
            .map(Value::Boolean)
            .ok_or_else(|| CoercionError::new(raw, kind, "expected `true` or `false`")),
        ValueKind::Integer => i64::from_str(input)
            .map(Value::Integer)
            .map_err(|e| CoercionError::new(raw, kind, e)),
        ValueKind::Float => f64::from_str(input)
            .map(Value::Float)
            .map_err(|e| CoercionError::new(raw, kind, e)),
        ValueKind::Decimal => Decimal::from_str(input)
            .map(Value::Decimal)
            .map_err(|e| CoercionError::new(raw, kind, e)),
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
