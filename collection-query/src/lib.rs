//! # collection-query
//!
//! Generic filtering, sorting, field projection, and pagination for REST
//! resource collections. Any item type that describes itself with a
//! [`Schema`](schema::Schema) can be queried by property name from a raw
//! query string.
//!
//! ## Features
//!
//! - **Filters**: `field__operator=value` pairs, dotted paths into nested objects, ten operators
//! - **Leniency**: unknown properties, bad values, and unsupported operators are dropped, never fatal
//! - **Sorting**: single key, stable, nulls first when ascending
//! - **Projection**: `fields=name,status` returns ordered maps of the selected properties
//! - **Pagination**: total counts, page math, query metadata, and hypermedia links
//! - **HTTP**: axum `IntoResponse` for results and errors (feature `http`, on by default)
//!
//! ## Example
//!
//! ```rust
//! use collection_query::prelude::*;
//! use once_cell::sync::Lazy;
//!
//! #[derive(Debug, Clone, serde::Serialize)]
//! struct Book {
//!     title: String,
//!     author: String,
//!     year: i64,
//! }
//!
//! impl Shape for Book {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Book>> = Lazy::new(|| {
//!             Schema::builder("Book")
//!                 .field("title", ValueKind::Text, |b: &Book| b.title.clone())
//!                 .field("author", ValueKind::Text, |b: &Book| b.author.clone())
//!                 .field("year", ValueKind::Integer, |b: &Book| b.year)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//!
//! let books = vec![
//!     Book { title: "Dune".into(), author: "Frank Herbert".into(), year: 1965 },
//!     Book { title: "Neuromancer".into(), author: "William Gibson".into(), year: 1984 },
//!     Book { title: "Hyperion".into(), author: "Dan Simmons".into(), year: 1989 },
//!     Book { title: "Foundation".into(), author: "Isaac Asimov".into(), year: 1951 },
//! ];
//!
//! let config = QueryConfig::default();
//! let (params, filters) = BaseQueryParameters::from_query_string(
//!     "year__gte=1960&nonsense__eq=1&sortBy=year&sortOrder=desc&fields=title&pageSize=2",
//!     &config,
//! );
//! let request = PageRequest::from_parameters(&params, filters);
//! let result = QueryEngine::new(config).execute(books, &request);
//!
//! assert_eq!(result.total_count, 3);
//! assert_eq!(result.total_pages(), 2);
//! assert_eq!(result.metadata.filters_applied, 1);
//! assert_eq!(result.dropped_filters.len(), 1);
//!
//! let response = HypermediaResponse::from_result(result, "/books", [("sortBy", "year")], None);
//! let json = serde_json::to_value(&response).unwrap();
//!
//! assert_eq!(json["data"]["items"], serde_json::json!([{ "title": "Hyperion" }, { "title": "Neuromancer" }]));
//! assert_eq!(json["data"]["pagination"]["links"]["next"], "/books?page=2&pageSize=2&sortBy=year");
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod paging;
pub mod projection;
pub mod query;
pub mod schema;
pub mod source;

#[cfg(test)]
mod test_support;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, QueryConfig, ServiceConfig};
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::observability::init_tracing;

    pub use crate::paging::{
        build_links, calculate_total_pages, CacheStatus, EnhancedPagedResult, HypermediaResponse,
        PageRequest, PagedResponse, PaginationLinks, QueryComplexity, QueryEngine, QueryMetadata,
        ShapedItem,
    };
    pub use crate::projection::{project, ProjectedItem};
    pub use crate::query::{
        parse_filter_string, BaseQueryParameters, FilterOperator, FilterParameter,
        FilterPredicate, QueryIssue, SortComparator, SortOrder,
    };
    pub use crate::schema::{coerce, FieldType, Schema, Shape, Value, ValueKind};
    pub use crate::source::{CollectionSource, InMemorySource, SourceError, SourceErrorKind};
}
