//! Response envelopes for paged collections
//!
//! - [`PagedResponse`]: the [`EnhancedPagedResult`] itself, with projected
//!   items in place of full items when a projection applied
//! - [`HypermediaResponse`]: a `{ success, message, data }` envelope whose
//!   pagination block carries navigation links
//!
//! Both implement axum's `IntoResponse` (feature `http`) as `200 OK` JSON.

#[cfg(feature = "http")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::engine::{EnhancedPagedResult, ShapedItem};
use super::links::{build_links, PaginationLinks};

/// Message used when a hypermedia response is built without one
pub const DEFAULT_MESSAGE: &str = "Items retrieved successfully";

/// A paged result ready to send
///
/// # Example
///
/// ```rust
/// use collection_query::paging::{PagedResponse, PageRequest, QueryEngine};
/// use collection_query::schema::{Schema, Shape, ValueKind};
/// use once_cell::sync::Lazy;
///
/// #[derive(serde::Serialize)]
/// struct Tag {
///     label: String,
/// }
///
/// impl Shape for Tag {
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: Lazy<Schema<Tag>> = Lazy::new(|| {
///             Schema::builder("Tag")
///                 .field("label", ValueKind::Text, |t: &Tag| t.label.clone())
///                 .build()
///         });
///         &SCHEMA
///     }
/// }
///
/// let tags = vec![Tag { label: "rust".into() }];
/// let result = QueryEngine::default().execute(tags, &PageRequest::new());
/// let response = PagedResponse::new(result);
///
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["items"][0]["label"], "rust");
/// assert_eq!(json["totalPages"], 1);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    /// The shaped page and its paging facts
    #[serde(flatten)]
    pub result: EnhancedPagedResult<ShapedItem<T>>,
    /// Number of pages at the current page size
    pub total_pages: u32,
    /// Whether a page follows this one
    pub has_next_page: bool,
    /// Whether a page precedes this one
    pub has_previous_page: bool,
}

impl<T> PagedResponse<T> {
    /// Shape a result for sending
    #[must_use]
    pub fn new(result: EnhancedPagedResult<T>) -> Self {
        let result = result.into_shaped();
        Self {
            total_pages: result.total_pages(),
            has_next_page: result.has_next_page(),
            has_previous_page: result.has_previous_page(),
            result,
        }
    }
}

impl<T> From<EnhancedPagedResult<T>> for PagedResponse<T> {
    fn from(result: EnhancedPagedResult<T>) -> Self {
        Self::new(result)
    }
}

#[cfg(feature = "http")]
impl<T: Serialize> IntoResponse for PagedResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Paging block of a [`HypermediaResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HypermediaPagination {
    /// Items matching the filters, across all pages
    pub total_items: u64,
    /// Number of pages
    pub total_pages: u32,
    /// 1-indexed current page
    pub current_page: u32,
    /// Items per page
    pub page_size: u32,
    /// Navigation links
    pub links: PaginationLinks,
}

/// Data block of a [`HypermediaResponse`]
#[derive(Debug, Clone, Serialize)]
pub struct HypermediaData<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Paging facts and links
    pub pagination: HypermediaPagination,
}

/// `{ success, message, data: { items, pagination } }` envelope
#[derive(Debug, Clone, Serialize)]
pub struct HypermediaResponse<T> {
    /// Always `true`; failures are sent as error responses
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// The page and its navigation
    pub data: HypermediaData<T>,
}

impl<T> HypermediaResponse<ShapedItem<T>> {
    /// Wrap a result, linking pages relative to `base_url`
    ///
    /// `extra_params` (typically the request's filters, sort, and field
    /// selection) are carried on every link so navigation keeps the query.
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::paging::{HypermediaResponse, PageRequest, QueryEngine};
    /// use collection_query::schema::{Schema, Shape, ValueKind};
    /// use once_cell::sync::Lazy;
    ///
    /// #[derive(serde::Serialize)]
    /// struct Tag {
    ///     label: String,
    /// }
    ///
    /// impl Shape for Tag {
    ///     fn schema() -> &'static Schema<Self> {
    ///         static SCHEMA: Lazy<Schema<Tag>> = Lazy::new(|| {
    ///             Schema::builder("Tag")
    ///                 .field("label", ValueKind::Text, |t: &Tag| t.label.clone())
    ///                 .build()
    ///         });
    ///         &SCHEMA
    ///     }
    /// }
    ///
    /// let tags: Vec<Tag> = (0..3).map(|n| Tag { label: format!("tag-{}", n) }).collect();
    /// let result = QueryEngine::default().execute(tags, &PageRequest::new().with_page_size(2));
    /// let response = HypermediaResponse::from_result(result, "/tags", [("sortBy", "label")], None);
    ///
    /// let links = &response.data.pagination.links;
    /// assert_eq!(links.next.as_deref(), Some("/tags?page=2&pageSize=2&sortBy=label"));
    /// assert!(links.previous.is_none());
    /// assert_eq!(response.message, "Items retrieved successfully");
    /// ```
    pub fn from_result<I, K, V>(
        result: EnhancedPagedResult<T>,
        base_url: &str,
        extra_params: I,
        message: Option<String>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let result = result.into_shaped();
        let total_pages = result.total_pages();
        let links = build_links(
            base_url,
            result.page_number,
            total_pages,
            result.page_size,
            extra_params,
        );

        Self {
            success: true,
            message: message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            data: HypermediaData {
                pagination: HypermediaPagination {
                    total_items: result.total_count,
                    total_pages,
                    current_page: result.page_number,
                    page_size: result.page_size,
                    links,
                },
                items: result.items,
            },
        }
    }
}

#[cfg(feature = "http")]
impl<T: Serialize> IntoResponse for HypermediaResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
