//! Hypermedia pagination links
//!
//! # Example
//!
//! ```rust
//! use collection_query::paging::build_links;
//!
//! let links = build_links("/api/tasks?status=Completed", 2, 3, 10, [("sortBy", "name")]);
//!
//! assert_eq!(links.first.as_deref(), Some("/api/tasks?page=1&pageSize=10&status=Completed&sortBy=name"));
//! assert_eq!(links.previous.as_deref(), Some("/api/tasks?page=1&pageSize=10&status=Completed&sortBy=name"));
//! assert_eq!(links.next.as_deref(), Some("/api/tasks?page=3&pageSize=10&status=Completed&sortBy=name"));
//! assert_eq!(links.last.as_deref(), Some("/api/tasks?page=3&pageSize=10&status=Completed&sortBy=name"));
//! ```

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Query parameter carrying the page number in generated links
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size in generated links
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Keys the link builder owns; callers' values for these are ignored
const OWNED_PARAMS: [&str; 3] = [PAGE_PARAM, PAGE_SIZE_PARAM, "pageNumber"];

/// Links to neighbouring pages of a collection
///
/// - `first` and `current` are always present
/// - `previous` is absent on page 1
/// - `next` is absent on the last page and beyond
/// - `last` is absent when there are no pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    /// Page 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// The page before the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// The current page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// The page after the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// The final page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Build first/previous/current/next/last links for a paged collection
///
/// Every link carries `page`, `pageSize`, then the query parameters already
/// on `base_url`, then `extra_params`, all form-urlencoded. Any `page`,
/// `pageNumber`, or `pageSize` among them is replaced.
pub fn build_links<I, K, V>(
    base_url: &str,
    current_page: u32,
    total_pages: u32,
    page_size: u32,
    extra_params: I,
) -> PaginationLinks
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base_url = base_url.split('#').next().unwrap_or_default();
    let (path, existing) = base_url.split_once('?').unwrap_or((base_url, ""));

    let mut params: Vec<(String, String)> = form_urlencoded::parse(existing.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.extend(
        extra_params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
    );
    params.retain(|(key, _)| !OWNED_PARAMS.iter().any(|owned| owned.eq_ignore_ascii_case(key)));

    let link = |page: u32| {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair(PAGE_PARAM, &page.to_string())
            .append_pair(PAGE_SIZE_PARAM, &page_size.to_string());
        for (key, value) in &params {
            query.append_pair(key, value);
        }
        format!("{}?{}", path, query.finish())
    };

    let current_page = current_page.max(1);
    PaginationLinks {
        first: Some(link(1)),
        previous: (current_page > 1).then(|| link(current_page - 1)),
        current: Some(link(current_page)),
        next: (current_page < total_pages).then(|| link(current_page + 1)),
        last: (total_pages > 0).then(|| link(total_pages)),
    }
}
