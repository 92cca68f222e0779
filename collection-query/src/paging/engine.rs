//! The query pipeline: filter, sort, count, slice, project
//!
//! # Example
//!
//! ```rust
//! use collection_query::paging::{PageRequest, QueryEngine};
//! use collection_query::query::{FilterParameter, SortOrder};
//! use collection_query::schema::{Schema, Shape, ValueKind};
//! use once_cell::sync::Lazy;
//!
//! #[derive(Debug, serde::Serialize)]
//! struct Article {
//!     title: String,
//!     views: i64,
//! }
//!
//! impl Shape for Article {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Article>> = Lazy::new(|| {
//!             Schema::builder("Article")
//!                 .field("title", ValueKind::Text, |a: &Article| a.title.clone())
//!                 .field("views", ValueKind::Integer, |a: &Article| a.views)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let articles: Vec<Article> = (1..=30)
//!     .map(|n| Article { title: format!("Article {:02}", n), views: n * 10 })
//!     .collect();
//!
//! let request = PageRequest::new()
//!     .with_filter(FilterParameter::gt("views", "50"))
//!     .with_sort("views", SortOrder::Desc)
//!     .with_page(2)
//!     .with_page_size(10);
//!
//! let result = QueryEngine::default().execute(articles, &request);
//!
//! assert_eq!(result.total_count, 25);
//! assert_eq!(result.total_pages(), 3);
//! assert_eq!(result.items.len(), 10);
//! assert_eq!(result.items[0].views, 200);
//! assert_eq!(result.metadata.filters_applied, 1);
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::metadata::{QueryComplexity, QueryMetadata};
use crate::config::QueryConfig;
use crate::error::Result;
use crate::projection::{project, ProjectedItem};
use crate::query::{
    BaseQueryParameters, FilterParameter, FilterPredicate, QueryIssue, SortComparator, SortOrder,
};
use crate::schema::{Schema, Shape};
use crate::source::CollectionSource;

/// Everything needed to run one query against a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Filters combined with AND
    #[serde(default)]
    pub filters: Vec<FilterParameter>,
    /// Dotted property path to sort by
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Sort direction
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Comma-separated top-level properties to project
    #[serde(default)]
    pub fields: Option<String>,
    /// 1-indexed page number
    #[serde(default = "first_page")]
    pub page_number: u32,
    /// Items per page. None uses the engine's configured default.
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort_by: None,
            sort_order: SortOrder::Asc,
            fields: None,
            page_number: first_page(),
            page_size: None,
        }
    }
}

impl PageRequest {
    /// A request for the first page with no filters, sort, or projection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine inbound parameters with their filters
    #[must_use]
    pub fn from_parameters(params: &BaseQueryParameters, filters: Vec<FilterParameter>) -> Self {
        Self {
            filters,
            sort_by: params.sort_by.clone(),
            sort_order: params.sort_order(),
            fields: params.fields.clone(),
            page_number: params.page_number(),
            page_size: params.page_size,
        }
    }

    /// Add a filter
    #[must_use]
    pub fn with_filter(mut self, filter: FilterParameter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace all filters
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<FilterParameter>) -> Self {
        self.filters = filters;
        self
    }

    /// Sort by a property path
    #[must_use]
    pub fn with_sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = order;
        self
    }

    /// Project the page to a comma-separated list of properties
    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    fn sort_requested(&self) -> bool {
        self.sort_by.as_ref().is_some_and(|s| !s.trim().is_empty())
    }

    fn fields_requested(&self) -> bool {
        self.fields
            .as_ref()
            .is_some_and(|f| f.split(',').any(|name| !name.trim().is_empty()))
    }
}

/// One page of a queried collection
///
/// `items` holds the full items of the page. When a field selection
/// matched, `projected_items` holds the same page projected; use
/// [`into_shaped`](Self::into_shaped) to get whichever applies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPagedResult<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// This page projected to the requested fields, empty when not projected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projected_items: Vec<ProjectedItem>,
    /// Items matching the filters, across all pages
    pub total_count: u64,
    /// 1-indexed page number
    pub page_number: u32,
    /// Items per page after bounds were applied
    pub page_size: u32,
    /// Sort property as requested
    pub sort_by: Option<String>,
    /// Sort direction as requested
    pub sort_order: SortOrder,
    /// Field selection as requested
    pub requested_fields: Option<String>,
    /// Execution facts
    pub metadata: QueryMetadata,
    /// Filters that were dropped while compiling
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_filters: Vec<QueryIssue>,
}

/// An item as returned to callers: projected when a projection applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShapedItem<T> {
    /// Only the requested properties
    Projected(ProjectedItem),
    /// The full item
    Full(T),
}

impl<T> EnhancedPagedResult<T> {
    /// Number of pages at the current page size
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        calculate_total_pages(self.total_count, self.page_size)
    }

    /// Check if a page follows this one
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages()
    }

    /// Check if a page precedes this one
    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    /// Check if the page was projected
    #[must_use]
    pub fn is_projected(&self) -> bool {
        !self.projected_items.is_empty()
    }

    /// Replace the page with projected items, or keep the full items
    ///
    /// This is where an empty projection falls back to the full items.
    #[must_use]
    pub fn into_shaped(self) -> EnhancedPagedResult<ShapedItem<T>> {
        let EnhancedPagedResult {
            items,
            projected_items,
            total_count,
            page_number,
            page_size,
            sort_by,
            sort_order,
            requested_fields,
            metadata,
            dropped_filters,
        } = self;

        let items = if projected_items.is_empty() {
            items.into_iter().map(ShapedItem::Full).collect()
        } else {
            projected_items.into_iter().map(ShapedItem::Projected).collect()
        };

        EnhancedPagedResult {
            items,
            projected_items: Vec::new(),
            total_count,
            page_number,
            page_size,
            sort_by,
            sort_order,
            requested_fields,
            metadata,
            dropped_filters,
        }
    }

    /// Transform the full items, keeping everything else
    pub fn map<U, F>(self, f: F) -> EnhancedPagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        EnhancedPagedResult {
            items: self.items.into_iter().map(f).collect(),
            projected_items: self.projected_items,
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            requested_fields: self.requested_fields,
            metadata: self.metadata,
            dropped_filters: self.dropped_filters,
        }
    }
}

/// Calculate total pages, rounding up
///
/// # Example
///
/// ```rust
/// use collection_query::paging::calculate_total_pages;
///
/// assert_eq!(calculate_total_pages(0, 10), 0);
/// assert_eq!(calculate_total_pages(25, 10), 3);
/// assert_eq!(calculate_total_pages(30, 10), 3);
/// ```
#[must_use]
pub fn calculate_total_pages(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Runs queries against in-memory sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryEngine {
    config: QueryConfig,
}

impl QueryEngine {
    /// Create an engine with the given paging limits
    #[must_use]
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// The paging limits in effect
    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Run `request` over `items` using `T`'s registered schema
    pub fn execute<T, I>(&self, items: I, request: &PageRequest) -> EnhancedPagedResult<T>
    where
        T: Shape,
        I: IntoIterator<Item = T>,
    {
        self.execute_with(T::schema(), items, request)
    }

    /// Run `request` over `items` using an explicit schema
    ///
    /// Filters first, then sorts, counts, and slices out the requested
    /// page. Only that page is projected. A page past the end is empty and
    /// still reports the full count.
    pub fn execute_with<T, I>(
        &self,
        schema: &Schema<T>,
        items: I,
        request: &PageRequest,
    ) -> EnhancedPagedResult<T>
    where
        I: IntoIterator<Item = T>,
    {
        let started = Instant::now();
        let page_number = request.page_number.max(1);
        let page_size = self.config.clamp_page_size(request.page_size);

        let predicate = FilterPredicate::build(schema, &request.filters);
        let comparator =
            SortComparator::build(schema, request.sort_by.as_deref(), request.sort_order);

        let matched = predicate.apply(items.into_iter().collect());
        let ordered = comparator.apply(matched);
        let total_count = ordered.len() as u64;

        let offset = (page_number as usize - 1).saturating_mul(page_size as usize);
        let items: Vec<T> = ordered
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        let execution_time = started.elapsed();

        let projected_items = match request.fields.as_deref() {
            Some(fields) => project(schema, &items, fields),
            None => Vec::new(),
        };

        let filters_applied = predicate.applied_count();
        let complexity = QueryComplexity::from_score(QueryComplexity::score(
            request.sort_requested(),
            request.fields_requested(),
            filters_applied,
        ));
        let metadata = QueryMetadata::new(execution_time, filters_applied, complexity);

        tracing::debug!(
            schema = schema.name(),
            total_count,
            page_number,
            page_size,
            filters_applied,
            filters_dropped = predicate.dropped().len(),
            complexity = %complexity,
            elapsed_ms = metadata.execution_time_ms(),
            "Query executed"
        );

        EnhancedPagedResult {
            items,
            projected_items,
            total_count,
            page_number,
            page_size,
            sort_by: request.sort_by.clone(),
            sort_order: request.sort_order,
            requested_fields: request.fields.clone(),
            metadata,
            dropped_filters: predicate.dropped().to_vec(),
        }
    }

    /// Fetch the base sequence from `source`, then run `request` over it
    ///
    /// # Errors
    ///
    /// Returns [`Error::Source`](crate::error::Error::Source) when the
    /// source cannot be read.
    pub async fn execute_from<T, S>(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<EnhancedPagedResult<T>>
    where
        T: Shape,
        S: CollectionSource<T>,
    {
        let items = source.fetch().await.map_err(|e| {
            tracing::warn!(
                schema = T::schema().name(),
                kind = %e.kind,
                retriable = e.is_retriable(),
                "Failed to fetch collection: {}", e.message
            );
            e
        })?;

        Ok(self.execute(items, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;
    use crate::source::{InMemorySource, SourceError, SourceResult};
    use crate::test_support::{names, numbered_tasks, sample_tasks, Task};

    fn engine() -> QueryEngine {
        QueryEngine::default()
    }

    #[test]
    fn test_default_request() {
        let result = engine().execute(sample_tasks(), &PageRequest::new());
        assert_eq!(result.items, sample_tasks());
        assert_eq!(result.total_count, 5);
        assert_eq!(result.page_number, 1);
        assert_eq!(result.page_size, 20);
        assert_eq!(result.total_pages(), 1);
        assert!(!result.has_next_page());
        assert!(!result.has_previous_page());
        assert!(!result.is_projected());
        assert_eq!(result.metadata.query_complexity, QueryComplexity::Simple);
    }

    #[test]
    fn test_third_page_sorted_descending() {
        let request = PageRequest::new()
            .with_sort("name", SortOrder::Desc)
            .with_page(3)
            .with_page_size(10);
        let result = engine().execute(numbered_tasks(25), &request);

        assert_eq!(result.total_count, 25);
        assert_eq!(result.total_pages(), 3);
        assert_eq!(
            names(&result.items),
            vec!["Task 05", "Task 04", "Task 03", "Task 02", "Task 01"]
        );
        assert!(!result.has_next_page());
        assert!(result.has_previous_page());
    }

    #[test]
    fn test_page_length_formula() {
        for total in [0_usize, 1, 9, 10, 11, 25] {
            for page in 1..=4_u32 {
                for size in [1_u32, 3, 10] {
                    let request = PageRequest::new().with_page(page).with_page_size(size);
                    let result = engine().execute(numbered_tasks(total), &request);
                    let skipped = (page as usize - 1) * size as usize;
                    let expected = (size as usize).min(total.saturating_sub(skipped));
                    assert_eq!(result.items.len(), expected, "total={total} page={page} size={size}");
                    assert_eq!(result.total_count, total as u64);
                }
            }
        }
    }

    #[test]
    fn test_filter_then_count() {
        let request = PageRequest::new()
            .with_filter(FilterParameter::eq("status", "Completed"))
            .with_filter(FilterParameter::lt("dueDate", "2025-01-01"))
            .with_page_size(1);
        let result = engine().execute(sample_tasks(), &request);

        assert_eq!(result.total_count, 2);
        assert_eq!(names(&result.items), vec!["Write proposal"]);
        assert_eq!(result.metadata.filters_applied, 2);
        assert_eq!(result.metadata.query_complexity, QueryComplexity::Medium);
    }

    #[test]
    fn test_page_past_the_end() {
        let request = PageRequest::new().with_page(9).with_page_size(2);
        let result = engine().execute(sample_tasks(), &request);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 5);
        assert_eq!(result.total_pages(), 3);
        assert!(!result.has_next_page());
    }

    #[test]
    fn test_sort_on_float_with_nan_still_executes() {
        let tasks: Vec<Task> = numbered_tasks(60)
            .into_iter()
            .map(|mut t| {
                if t.priority % 3 == 0 {
                    t.estimate_hours = f64::NAN;
                }
                t
            })
            .collect();

        let request = PageRequest::new()
            .with_sort("estimateHours", SortOrder::Asc)
            .with_page(3)
            .with_page_size(20);
        let result = engine().execute(tasks, &request);
        assert_eq!(result.total_count, 60);
        assert_eq!(result.items.len(), 20);
        assert!(result.items.iter().all(|t| t.estimate_hours.is_nan()));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let result = engine().execute(sample_tasks(), &PageRequest::new().with_page(0));
        assert_eq!(result.page_number, 1);
        assert_eq!(result.items.len(), 5);
    }

    #[test]
    fn test_page_size_clamped_by_config() {
        let engine = QueryEngine::new(QueryConfig {
            default_page_size: 2,
            max_page_size: 3,
        });
        let result = engine.execute(sample_tasks(), &PageRequest::new());
        assert_eq!(result.page_size, 2);
        assert_eq!(result.items.len(), 2);

        let result = engine.execute(sample_tasks(), &PageRequest::new().with_page_size(50));
        assert_eq!(result.page_size, 3);
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn test_projection_covers_page_only() {
        let request = PageRequest::new()
            .with_sort("priority", SortOrder::Asc)
            .with_fields("name, priority")
            .with_page_size(2);
        let result = engine().execute(sample_tasks(), &request);

        assert!(result.is_projected());
        assert_eq!(result.projected_items.len(), 2);
        assert_eq!(result.projected_items[0]["name"], Value::from("Review PR"));
        assert_eq!(result.projected_items[1]["priority"], Value::from(2_i64));
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn test_into_shaped_falls_back_to_full_items() {
        let result = engine().execute(sample_tasks(), &PageRequest::new().with_fields("  "));
        assert!(!result.is_projected());
        let shaped = result.into_shaped();
        assert!(matches!(shaped.items[0], ShapedItem::Full(_)));
        assert_eq!(shaped.items.len(), 5);
    }

    #[test]
    fn test_into_shaped_uses_projection() {
        let result = engine().execute(sample_tasks(), &PageRequest::new().with_fields("status"));
        let shaped = result.into_shaped();
        assert!(shaped.projected_items.is_empty());
        let json = serde_json::to_value(&shaped).unwrap();
        assert_eq!(json["items"][0], serde_json::json!({ "status": "Completed" }));
        assert!(json.get("projectedItems").is_none());
    }

    #[test]
    fn test_dropped_filters_are_reported() {
        let request = PageRequest::new()
            .with_filter(FilterParameter::eq("salary", "10"))
            .with_filter(FilterParameter::eq("status", "Pending"));
        let result = engine().execute(sample_tasks(), &request);

        assert_eq!(names(&result.items), vec!["Deploy"]);
        assert_eq!(result.metadata.filters_applied, 1);
        assert_eq!(result.dropped_filters.len(), 1);
        assert_eq!(result.dropped_filters[0].path(), "salary");
    }

    #[test]
    fn test_complexity_counts_requested_sort_and_fields() {
        let request = PageRequest::new()
            .with_sort("name", SortOrder::Asc)
            .with_fields("name")
            .with_filter(FilterParameter::gte("priority", "1"))
            .with_filter(FilterParameter::eq("isBillable", "true"))
            .with_filter(FilterParameter::ne("status", "Pending"));
        let result = engine().execute(sample_tasks(), &request);
        assert_eq!(result.metadata.query_complexity, QueryComplexity::Complex);
    }

    #[test]
    fn test_from_parameters() {
        let params = BaseQueryParameters::new()
            .with_page(2)
            .with_page_size(3)
            .with_sort("priority")
            .with_order(SortOrder::Desc)
            .with_fields("name");
        let request =
            PageRequest::from_parameters(&params, vec![FilterParameter::eq("isBillable", "true")]);
        assert_eq!(request.page_number, 2);
        assert_eq!(request.page_size, Some(3));
        assert_eq!(request.sort_order, SortOrder::Desc);

        let result = engine().execute(sample_tasks(), &request);
        assert_eq!(result.total_count, 3);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_map_keeps_paging() {
        let result = engine()
            .execute(sample_tasks(), &PageRequest::new().with_page_size(2))
            .map(|t| t.name);
        assert_eq!(result.items, vec!["Write proposal", "Design schema"]);
        assert_eq!(result.total_count, 5);
    }

    #[test]
    fn test_result_serialization() {
        let result = engine().execute(sample_tasks(), &PageRequest::new().with_page_size(1));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalCount"], 5);
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["pageSize"], 1);
        assert_eq!(json["sortOrder"], "asc");
        assert_eq!(json["items"][0]["name"], "Write proposal");
        assert!(json.get("droppedFilters").is_none());
    }

    #[test]
    fn test_calculate_total_pages() {
        assert_eq!(calculate_total_pages(1, 1), 1);
        assert_eq!(calculate_total_pages(11, 10), 2);
        assert_eq!(calculate_total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_request_deserialize() {
        let request: PageRequest = serde_json::from_str(
            r#"{"filters":[{"field":"status","operator":"ne","value":"Pending"}],"sortOrder":"DESC"}"#,
        )
        .unwrap();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.sort_order, SortOrder::Desc);
        assert_eq!(request.filters, vec![FilterParameter::ne("status", "Pending")]);
    }

    struct BrokenSource;

    impl CollectionSource<Task> for BrokenSource {
        async fn fetch(&self) -> SourceResult<Vec<Task>> {
            Err(SourceError::connection_failed("refused").with_collection("tasks"))
        }
    }

    #[tokio::test]
    async fn test_execute_from_source() {
        let source = InMemorySource::new("tasks", sample_tasks());
        let request = PageRequest::new().with_filter(FilterParameter::contains("name", "s"));
        let result = engine().execute_from(&source, &request).await.unwrap();
        assert_eq!(
            names(&result.items),
            vec!["Write proposal", "Design schema"]
        );
    }

    #[tokio::test]
    async fn test_execute_from_propagates_source_errors() {
        let err = engine()
            .execute_from(&BrokenSource, &PageRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Source(_)));
        assert!(err.is_retriable());
    }
}
