//! Typed runtime values read from items and coerced from query strings
//!
//! Every property registered in a [`Schema`](super::Schema) declares a
//! [`FieldType`] and yields a [`Value`] when read. Filter values are coerced
//! into the same representation, so comparisons never cross kinds.
//!
//! # Example
//!
//! ```rust
//! use collection_query::schema::{Value, ValueKind};
//!
//! let name: Value = "Alice".into();
//! let age: Value = 42_i64.into();
//! let missing: Value = Option::<i64>::None.into();
//!
//! assert_eq!(name.kind(), Some(ValueKind::Text));
//! assert_eq!(age.kind(), Some(ValueKind::Integer));
//! assert!(missing.is_null());
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// The underlying kind of a scalar property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free-form text
    Text,
    /// Opaque unique identifier
    Uuid,
    /// Point in time (UTC)
    Timestamp,
    /// `true` / `false`
    Boolean,
    /// Signed 64-bit integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Fixed-point decimal
    Decimal,
}

impl ValueKind {
    /// Whether `gt`/`gte`/`lt`/`lte` make sense for this kind
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::schema::ValueKind;
    ///
    /// assert!(ValueKind::Integer.is_orderable());
    /// assert!(ValueKind::Timestamp.is_orderable());
    /// assert!(!ValueKind::Text.is_orderable());
    /// assert!(!ValueKind::Boolean.is_orderable());
    /// ```
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Decimal | Self::Timestamp
        )
    }

    /// Whether substring operators apply to this kind
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Uuid => write!(f, "uuid"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Decimal => write!(f, "decimal"),
        }
    }
}

/// Declared type of a scalar property: its kind plus nullability
///
/// # Example
///
/// ```rust
/// use collection_query::schema::{FieldType, ValueKind};
///
/// let due = FieldType::nullable(ValueKind::Timestamp);
/// assert!(due.nullable);
/// assert_eq!(due.kind, ValueKind::Timestamp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    /// Underlying kind
    pub kind: ValueKind,
    /// Whether the property may hold no value
    pub nullable: bool,
}

impl FieldType {
    /// A property that always holds a value
    #[must_use]
    pub const fn required(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// A property that may hold no value
    #[must_use]
    pub const fn nullable(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// The same kind, marked nullable
    #[must_use]
    pub const fn as_nullable(self) -> Self {
        Self::nullable(self.kind)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// A runtime value read from an item or coerced from a query string
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value
    Null,
    /// Text value
    Text(String),
    /// Unique identifier
    Uuid(Uuid),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Boolean value
    Boolean(bool),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Fixed-point decimal value
    Decimal(Decimal),
    /// Nested object, produced only by field projection
    Object(IndexMap<String, Value>),
}

impl Value {
    /// The kind of a scalar value, `None` for `Null` and objects
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Text(_) => Some(ValueKind::Text),
            Self::Uuid(_) => Some(ValueKind::Uuid),
            Self::Timestamp(_) => Some(ValueKind::Timestamp),
            Self::Boolean(_) => Some(ValueKind::Boolean),
            Self::Integer(_) => Some(ValueKind::Integer),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Decimal(_) => Some(ValueKind::Decimal),
            Self::Null | Self::Object(_) => None,
        }
    }

    /// Check if this is `Null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a `Text` value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Natural ordering between two values
    ///
    /// `Null` sorts before everything else. Integers and floats compare
    /// numerically with each other; any other pair of different kinds, NaN,
    /// and objects are unordered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use collection_query::schema::Value;
    ///
    /// assert_eq!(Value::from(1_i64).compare(&Value::from(2_i64)), Some(Ordering::Less));
    /// assert_eq!(Value::Null.compare(&Value::from("a")), Some(Ordering::Less));
    /// assert_eq!(Value::from(true).compare(&Value::from(1_i64)), None);
    /// ```
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Self::Decimal(a), Self::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
            _ => None,
        }
    }
}

impl Value {
    /// Total ordering used for sorting
    ///
    /// `Null` comes first. Values of the same kind compare naturally, with
    /// floats ordered by [`f64::total_cmp`] so NaN sorts after every number.
    /// Values of different kinds order by kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use collection_query::schema::Value;
    ///
    /// assert_eq!(Value::from(f64::NAN).total_cmp(&Value::from(1.0)), Ordering::Greater);
    /// assert_eq!(Value::Null.total_cmp(&Value::from(f64::NAN)), Ordering::Less);
    /// ```
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Object(_), Self::Object(_)) => Ordering::Equal,
            _ if self.rank() == other.rank() => self.compare(other).unwrap_or(Ordering::Equal),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Text(_) => 1,
            Self::Uuid(_) => 2,
            Self::Timestamp(_) => 3,
            Self::Boolean(_) => 4,
            Self::Integer(_) => 5,
            Self::Float(_) => 6,
            Self::Decimal(_) => 7,
            Self::Object(_) => 8,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Text(s) => write!(f, "{}", s),
            Self::Uuid(id) => write!(f, "{}", id),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Object(map) => write!(f, "{{{} fields}}", map.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Uuid(id) => Serialize::serialize(id, serializer),
            Self::Timestamp(ts) => Serialize::serialize(ts, serializer),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Decimal(d) => Serialize::serialize(d, serializer),
            Self::Object(map) => Serialize::serialize(map, serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
