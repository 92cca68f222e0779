//! Inbound collection query parameters
//!
//! [`BaseQueryParameters`] carries the pagination, sorting, and field
//! selection part of a request. Filters travel separately as
//! [`FilterParameter`] triples.
//!
//! # Example
//!
//! ```rust
//! use collection_query::query::{BaseQueryParameters, SortOrder};
//!
//! let params = BaseQueryParameters::default()
//!     .with_page(2)
//!     .with_page_size(50)
//!     .with_sort("dueDate")
//!     .with_order(SortOrder::Desc);
//!
//! assert_eq!(params.page_number(), 2);
//! assert_eq!(params.page_size(), 50);
//! assert_eq!(params.offset(), 50);
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use url::form_urlencoded;

use super::filter::FilterParameter;
use crate::config::QueryConfig;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum allowed items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction
///
/// Parsing is lenient: `desc` in any case is descending, anything else
/// (including garbage) is ascending.
///
/// # Example
///
/// ```rust
/// use collection_query::query::SortOrder;
///
/// assert_eq!(SortOrder::from("DESC"), SortOrder::Desc);
/// assert_eq!(SortOrder::from("sideways"), SortOrder::Asc);
/// assert_eq!(format!("{}", SortOrder::Desc), "desc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending, nulls first
    #[default]
    Asc,
    /// Descending, nulls last
    Desc,
}

impl SortOrder {
    /// Check if this is `Desc`
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl From<&str> for SortOrder {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl From<Option<&str>> for SortOrder {
    fn from(value: Option<&str>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Pagination, sorting, and field selection for a collection request
///
/// Every field is optional on the wire; the accessors apply defaults and
/// bounds. Keys are camelCase (`pageNumber`, `pageSize`, `sortBy`,
/// `sortOrder`, `fields`), and `page` is accepted for `pageNumber`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseQueryParameters {
    /// Page number (1-indexed). None defaults to 1.
    #[serde(default, alias = "page", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Items per page. None defaults to DEFAULT_PAGE_SIZE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Dotted property path to sort by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Sort direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    /// Comma-separated top-level property names to project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

impl BaseQueryParameters {
    /// Create empty parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the sort property path
    #[must_use]
    pub fn with_sort(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Set the sort direction
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Set the field selection
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::query::BaseQueryParameters;
    ///
    /// let params = BaseQueryParameters::new().with_fields("name, status");
    /// assert!(params.has_fields());
    /// assert!(!BaseQueryParameters::new().with_fields("  ").has_fields());
    /// ```
    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// The 1-indexed page number; page 0 is treated as page 1
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page_number.unwrap_or(1).max(1)
    }

    /// The page size, bounded by [`DEFAULT_PAGE_SIZE`] and [`MAX_PAGE_SIZE`]
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::query::BaseQueryParameters;
    ///
    /// assert_eq!(BaseQueryParameters::new().page_size(), 20);
    /// assert_eq!(BaseQueryParameters::new().with_page_size(500).page_size(), 100);
    /// assert_eq!(BaseQueryParameters::new().with_page_size(0).page_size(), 1);
    /// ```
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size_for(&QueryConfig::default())
    }

    /// The page size, bounded by a service's configured limits
    #[must_use]
    pub fn page_size_for(&self, config: &QueryConfig) -> u32 {
        config.clamp_page_size(self.page_size)
    }

    /// Number of items skipped before the current page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number() - 1) * u64::from(self.page_size())
    }

    /// The sort direction, ascending when unset
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Check if a non-blank sort property is set
    #[must_use]
    pub fn has_sort(&self) -> bool {
        self.sort_by.as_ref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Check if a non-blank field selection is set
    #[must_use]
    pub fn has_fields(&self) -> bool {
        self.fields.as_ref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Split a raw query string into parameters and filters
    ///
    /// Reserved keys (`pageNumber` or `page`, `pageSize`, `sortBy`,
    /// `sortOrder`, `fields`) match case-insensitively and fill the
    /// parameters. Unparseable page numbers are ignored. Every other pair
    /// is read as a `field[__operator]=value` filter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::config::QueryConfig;
    /// use collection_query::query::{BaseQueryParameters, FilterParameter, SortOrder};
    ///
    /// let (params, filters) = BaseQueryParameters::from_query_string(
    ///     "page=3&pagesize=10&sortBy=name&sortOrder=desc&status=Completed",
    ///     &QueryConfig::default(),
    /// );
    ///
    /// assert_eq!(params.page_number(), 3);
    /// assert_eq!(params.page_size(), 10);
    /// assert_eq!(params.sort_order(), SortOrder::Desc);
    /// assert_eq!(filters, vec![FilterParameter::eq("status", "Completed")]);
    /// ```
    pub fn from_query_string(query: &str, config: &QueryConfig) -> (Self, Vec<FilterParameter>) {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        let mut filters = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match ReservedKey::parse(&key) {
                Some(ReservedKey::PageNumber) => {
                    params.page_number = parse_count(&key, &value);
                }
                Some(ReservedKey::PageSize) => {
                    params.page_size = parse_count(&key, &value)
                        .map(|size| size.clamp(1, config.max_page_size.max(1)));
                }
                Some(ReservedKey::SortBy) => params.sort_by = Some(value.into_owned()),
                Some(ReservedKey::SortOrder) => params.sort_order = Some(SortOrder::from(&*value)),
                Some(ReservedKey::Fields) => params.fields = Some(value.into_owned()),
                None => match FilterParameter::parse_pair(&key, &value) {
                    Ok(filter) => filters.push(filter),
                    Err(issue) => {
                        tracing::debug!(key = %key, reason = %issue, "Dropping unparseable filter");
                    }
                },
            }
        }

        (params, filters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservedKey {
    PageNumber,
    PageSize,
    SortBy,
    SortOrder,
    Fields,
}

impl ReservedKey {
    fn parse(key: &str) -> Option<Self> {
        const KEYS: [(&str, ReservedKey); 6] = [
            ("pageNumber", ReservedKey::PageNumber),
            ("page", ReservedKey::PageNumber),
            ("pageSize", ReservedKey::PageSize),
            ("sortBy", ReservedKey::SortBy),
            ("sortOrder", ReservedKey::SortOrder),
            ("fields", ReservedKey::Fields),
        ];
        let key = key.trim();
        KEYS.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, reserved)| *reserved)
    }
}

fn parse_count(key: &str, value: &str) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::debug!(key = %key, value = %value, reason = %e, "Ignoring non-numeric paging value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_display() {
        assert_eq!(format!("{}", SortOrder::Asc), "asc");
        assert_eq!(format!("{}", SortOrder::Desc), "desc");
    }

    #[test]
    fn test_sort_order_lenient_parse() {
        assert_eq!(SortOrder::from("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::from(" Desc "), SortOrder::Desc);
        assert_eq!(SortOrder::from("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::from("descending"), SortOrder::Asc);
        assert_eq!(SortOrder::from(""), SortOrder::Asc);
        assert_eq!(SortOrder::from(None::<&str>), SortOrder::Asc);
        assert_eq!(SortOrder::from(Some("DESC")), SortOrder::Desc);
    }

    #[test]
    fn test_sort_order_serde() {
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"desc\"");
        let order: SortOrder = serde_json::from_str("\"DESC\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
        let order: SortOrder = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
    }

    #[test]
    fn test_defaults() {
        let params = BaseQueryParameters::new();
        assert_eq!(params, BaseQueryParameters::default());
        assert_eq!(params.page_number(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.sort_order(), SortOrder::Asc);
        assert!(!params.has_sort());
        assert!(!params.has_fields());
    }

    #[test]
    fn test_page_zero_is_page_one() {
        assert_eq!(BaseQueryParameters::new().with_page(0).page_number(), 1);
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(BaseQueryParameters::new().with_page_size(0).page_size(), 1);
        assert_eq!(
            BaseQueryParameters::new().with_page_size(101).page_size(),
            MAX_PAGE_SIZE
        );
    }

    #[test]
    fn test_page_size_for_config() {
        let config = QueryConfig {
            default_page_size: 5,
            max_page_size: 25,
        };
        assert_eq!(BaseQueryParameters::new().page_size_for(&config), 5);
        assert_eq!(
            BaseQueryParameters::new()
                .with_page_size(80)
                .page_size_for(&config),
            25
        );
    }

    #[test]
    fn test_offset() {
        let params = BaseQueryParameters::new().with_page(3).with_page_size(10);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_has_sort_ignores_blank() {
        assert!(!BaseQueryParameters::new().with_sort("  ").has_sort());
        assert!(BaseQueryParameters::new().with_sort("name").has_sort());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let params: BaseQueryParameters = serde_json::from_str(
            r#"{"pageNumber":2,"pageSize":15,"sortBy":"name","sortOrder":"DESC","fields":"name"}"#,
        )
        .unwrap();
        assert_eq!(params.page_number(), 2);
        assert_eq!(params.page_size(), 15);
        assert_eq!(params.sort_by.as_deref(), Some("name"));
        assert_eq!(params.sort_order(), SortOrder::Desc);
        assert_eq!(params.fields.as_deref(), Some("name"));
    }

    #[test]
    fn test_deserialize_page_alias() {
        let params: BaseQueryParameters = serde_json::from_str(r#"{"page":4}"#).unwrap();
        assert_eq!(params.page_number(), 4);
    }

    #[test]
    fn test_serialize_skips_unset() {
        let json = serde_json::to_value(BaseQueryParameters::new().with_page(2)).unwrap();
        assert_eq!(json, serde_json::json!({ "pageNumber": 2 }));
    }

    #[test]
    fn test_from_query_string_splits_reserved_keys() {
        let (params, filters) = BaseQueryParameters::from_query_string(
            "?pageNumber=2&PAGESIZE=5&fields=name,status&priority__gte=3&manager.fullName__contains=ada",
            &QueryConfig::default(),
        );
        assert_eq!(params.page_number(), 2);
        assert_eq!(params.page_size(), 5);
        assert_eq!(params.fields.as_deref(), Some("name,status"));
        assert_eq!(
            filters,
            vec![
                FilterParameter::gte("priority", "3"),
                FilterParameter::contains("manager.fullName", "ada"),
            ]
        );
    }

    #[test]
    fn test_from_query_string_ignores_bad_numbers() {
        let (params, filters) = BaseQueryParameters::from_query_string(
            "page=abc&pageSize=-1",
            &QueryConfig::default(),
        );
        assert_eq!(params.page_number, None);
        assert_eq!(params.page_size, None);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_from_query_string_clamps_to_config() {
        let config = QueryConfig {
            default_page_size: 20,
            max_page_size: 50,
        };
        let (params, _) = BaseQueryParameters::from_query_string("pageSize=500", &config);
        assert_eq!(params.page_size, Some(50));
    }

    #[test]
    fn test_from_query_string_drops_unknown_operator() {
        let (_, filters) =
            BaseQueryParameters::from_query_string("name__like=x&name=y", &QueryConfig::default());
        assert_eq!(filters, vec![FilterParameter::eq("name", "y")]);
    }
}
