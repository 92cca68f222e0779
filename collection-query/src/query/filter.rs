//! Filter triples and the raw `field__operator=value` grammar
//!
//! A [`FilterParameter`] names a (possibly dotted) property, an operator, and
//! an untyped value. Calling services build them from typed request fields,
//! or parse them from a query string with [`parse_filter_string`].
//!
//! # Example
//!
//! ```rust
//! use collection_query::query::{parse_filter_string, FilterOperator, FilterParameter};
//!
//! let filters = parse_filter_string("status=Completed&dueDate__lt=2025-01-01&priority__in=1%2C2");
//!
//! assert_eq!(filters, vec![
//!     FilterParameter::eq("status", "Completed"),
//!     FilterParameter::lt("dueDate", "2025-01-01"),
//!     FilterParameter::new("priority", FilterOperator::In, "1,2"),
//! ]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::issue::QueryIssue;

/// Separator between a field name and its operator in the raw grammar
pub const OPERATOR_SEPARATOR: &str = "__";

/// Comparison operators for filter parameters
///
/// # Example
///
/// ```rust
/// use collection_query::query::FilterOperator;
///
/// let op: FilterOperator = "StartsWith".parse().unwrap();
/// assert_eq!(op, FilterOperator::StartsWith);
/// assert_eq!(format!("{}", op), "startswith");
/// assert!("like".parse::<FilterOperator>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    #[default]
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Text contains the value
    Contains,
    /// Text starts with the value
    StartsWith,
    /// Text ends with the value
    EndsWith,
    /// Value is one of a comma-separated list
    In,
}

impl FilterOperator {
    /// All operators, in declaration order
    pub const ALL: [Self; 10] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::In,
    ];

    /// The token used in query strings
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::In => "in",
        }
    }

    /// `gt`, `gte`, `lt`, `lte`: valid only on orderable kinds
    #[must_use]
    pub const fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// `contains`, `startswith`, `endswith`: valid only on text
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An operator token that is not one of the supported operators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter operator `{0}`")]
pub struct UnknownOperator(pub String);

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// A single `(field, operator, value)` filter
///
/// The value stays raw until the filter is compiled against a schema, where
/// it is coerced into the resolved property's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParameter {
    /// Dotted property path
    pub field: String,
    /// Comparison operator
    #[serde(default)]
    pub operator: FilterOperator,
    /// Raw value; comma-separated for `in`
    pub value: String,
}

impl FilterParameter {
    /// Create a new filter parameter
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    /// Text containment
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    /// Text prefix
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, value)
    }

    /// Text suffix
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, value)
    }

    /// Membership in a list of values, joined with commas
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::query::FilterParameter;
    ///
    /// let filter = FilterParameter::one_of("status", ["Pending", "Completed"]);
    /// assert_eq!(filter.value, "Pending,Completed");
    /// ```
    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(field, FilterOperator::In, joined)
    }

    /// Parse one decoded `key=value` pair of the raw grammar
    ///
    /// The key is `field` or `field__operator`; a missing operator means `eq`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryIssue::UnsupportedOperator`] for an unknown operator
    /// suffix and [`QueryIssue::PropertyResolution`] for an empty field.
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::query::{FilterOperator, FilterParameter};
    ///
    /// let filter = FilterParameter::parse_pair("name__contains", "login").unwrap();
    /// assert_eq!(filter.operator, FilterOperator::Contains);
    /// assert_eq!(filter.field, "name");
    ///
    /// assert!(FilterParameter::parse_pair("name__like", "login").is_err());
    /// ```
    pub fn parse_pair(key: &str, value: &str) -> Result<Self, QueryIssue> {
        let key = key.trim();
        let (field, operator) = match key.rsplit_once(OPERATOR_SEPARATOR) {
            Some((field, token)) => {
                let operator = token
                    .parse::<FilterOperator>()
                    .map_err(|_| QueryIssue::UnsupportedOperator {
                        path: field.to_string(),
                        operator: token.to_string(),
                    })?;
                (field, operator)
            }
            None => (key, FilterOperator::Eq),
        };

        if field.is_empty() {
            return Err(QueryIssue::PropertyResolution {
                path: key.to_string(),
            });
        }

        Ok(Self::new(field, operator, value))
    }
}

impl fmt::Display for FilterParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}={}",
            self.field, OPERATOR_SEPARATOR, self.operator, self.value
        )
    }
}

/// Parse `field[__operator]=value` pairs joined by `&`
///
/// Keys and values are percent-decoded (`+` decodes to a space). A leading
/// `?` is ignored. Pairs with an unknown operator or empty field are dropped.
pub fn parse_filter_string(query: &str) -> Vec<FilterParameter> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .filter_map(|(key, value)| match FilterParameter::parse_pair(&key, &value) {
            Ok(filter) => Some(filter),
            Err(issue) => {
                tracing::debug!(key = %key, reason = %issue, "Dropping unparseable filter");
                None
            }
        })
        .collect()
}
